use crate::commands::{self, Command};

/// Any type which can sink commands.
pub trait CommandWrite<Command> {
    /// Inserts a command.
    fn write(&mut self, command: Command);
}
impl<Write, Command> CommandWrite<Command> for &mut Write
where
    Write: CommandWrite<Command>,
{
    fn write(&mut self, command: Command) {
        (**self).write(command);
    }
}
// Any subcommand that can be wrapped in Command can be written into any
// smallvec of Command.
impl<Subcommand, Array> CommandWrite<Subcommand> for smallvec::SmallVec<Array>
where
    Subcommand: Into<Command>,
    Array: smallvec::Array<Item = Command>,
{
    fn write(&mut self, command: Subcommand) {
        self.push(command.into());
    }
}

pub struct SceneQueueWriter<'a> {
    pub(super) lock: parking_lot::RwLockWriteGuard<'a, super::SceneQueueInner>,
    // Optimize for exactly one command (the most common case)
    pub(super) commands: smallvec::SmallVec<[Command; 1]>,
}
// The recorded commands always land in history, even when unwinding, so that
// history keeps matching the state the writer left behind.
impl Drop for SceneQueueWriter<'_> {
    fn drop(&mut self) {
        let command = if std::thread::panicking() {
            if self.commands.is_empty() {
                return;
            }
            Command::Meta(commands::MetaCommand::Scope(
                commands::ScopeType::WritePanic,
                std::mem::take(&mut self.commands).into_boxed_slice(),
            ))
        } else {
            match self.commands.len() {
                0 => return,
                1 => match self.commands.pop() {
                    Some(command) => command,
                    None => return,
                },
                _ => Command::Meta(commands::MetaCommand::Scope(
                    commands::ScopeType::Atoms,
                    std::mem::take(&mut self.commands).into_boxed_slice(),
                )),
            }
        };

        log::trace!("Writing new command: {:#?}", command);
        self.lock.push_history(command);
    }
}
impl SceneQueueWriter<'_> {
    pub fn scene(
        &'_ mut self,
    ) -> crate::state::writer::SceneWriter<'_, &mut smallvec::SmallVec<[Command; 1]>> {
        crate::state::writer::SceneWriter::new(&mut self.commands, &mut self.lock.scene)
    }
}
