//! Recording access to a [`Scene`], and the means to replay what was recorded.

use super::{AppState, Element, ElementId, Scene};
use crate::commands::{
    AppStateCommand, Command, CommandConsumer, CommandError, DoUndo, ElementCommand, MetaCommand,
};
use crate::queue::writer::CommandWrite;

/// Mutable access to a scene, where every change is written as a command.
pub struct SceneWriter<'a, Write> {
    writer: Write,
    state: &'a mut Scene,
}
impl<Write> std::ops::Deref for SceneWriter<'_, Write> {
    type Target = Scene;
    fn deref(&self) -> &Self::Target {
        self.state
    }
}
impl<'a, Write: CommandWrite<Command>> SceneWriter<'a, Write> {
    pub fn new(writer: Write, state: &'a mut Scene) -> Self {
        Self { writer, state }
    }
    /// Add an element on top of all others, returning its index.
    pub fn push(&mut self, element: Element) -> usize {
        let index = self.state.elements.len();
        self.state.elements.push(element.clone());
        self.writer.write(
            ElementCommand::Inserted {
                index,
                element: Box::new(element),
            }
            .into(),
        );
        index
    }
    /// Modify an element in place. Its version is bumped.
    /// # Errors
    /// If no element has the given ID.
    pub fn update(
        &mut self,
        id: &ElementId,
        f: impl FnOnce(&mut Element),
    ) -> Result<(), CommandError> {
        let index = self
            .state
            .position_of(id)
            .ok_or(CommandError::UnknownResource)?;
        let element = &mut self.state.elements[index];
        let from = Box::new(element.clone());
        f(element);
        // Identity is not up for modification.
        element.id = from.id.clone();
        element.version = from.version.wrapping_add(1);

        self.writer.write(
            ElementCommand::Changed {
                index,
                from,
                to: Box::new(element.clone()),
            }
            .into(),
        );
        Ok(())
    }
    /// Soft-delete an element.
    /// # Errors
    /// If no element has the given ID.
    pub fn delete(&mut self, id: &ElementId) -> Result<(), CommandError> {
        self.update(id, |element| element.is_deleted = true)
    }
    /// Remove every element, topmost first.
    pub fn clear(&mut self) {
        while let Some(element) = self.state.elements.pop() {
            let index = self.state.elements.len();
            self.writer.write(
                ElementCommand::Removed {
                    index,
                    element: Box::new(element),
                }
                .into(),
            );
        }
    }
    /// Swap out the whole element list.
    pub fn replace_elements(&mut self, elements: Vec<Element>) {
        self.clear();
        for element in elements {
            self.push(element);
        }
    }
    /// Replace the app state. Nothing is written if it is unchanged.
    pub fn set_app_state(&mut self, to: AppState) {
        if self.state.app_state == to {
            return;
        }
        let from = std::mem::replace(&mut self.state.app_state, to.clone());
        self.writer.write(
            AppStateCommand::Changed {
                from: Box::new(from),
                to: Box::new(to),
            }
            .into(),
        );
    }
}

impl CommandConsumer<ElementCommand> for Vec<Element> {
    fn apply(&mut self, command: DoUndo<'_, ElementCommand>) -> Result<(), CommandError> {
        match command {
            DoUndo::Do(ElementCommand::Inserted { index, element })
            | DoUndo::Undo(ElementCommand::Removed { index, element }) => {
                if *index > self.len() {
                    return Err(CommandError::UnknownResource);
                }
                if self.iter().any(|e| e.id == element.id) {
                    return Err(CommandError::MismatchedState);
                }
                self.insert(*index, Element::clone(element));
                Ok(())
            }
            DoUndo::Undo(ElementCommand::Inserted { index, element })
            | DoUndo::Do(ElementCommand::Removed { index, element }) => {
                let current = self.get(*index).ok_or(CommandError::UnknownResource)?;
                if current != element.as_ref() {
                    return Err(CommandError::MismatchedState);
                }
                self.remove(*index);
                Ok(())
            }
            DoUndo::Do(ElementCommand::Changed { index, from, to })
            | DoUndo::Undo(ElementCommand::Changed {
                index,
                from: to,
                to: from,
            }) => {
                let current = self.get_mut(*index).ok_or(CommandError::UnknownResource)?;
                if current != from.as_ref() {
                    return Err(CommandError::MismatchedState);
                }
                *current = Element::clone(to);
                Ok(())
            }
        }
    }
}

impl CommandConsumer<AppStateCommand> for AppState {
    fn apply(&mut self, command: DoUndo<'_, AppStateCommand>) -> Result<(), CommandError> {
        let (DoUndo::Do(AppStateCommand::Changed { from, to })
        | DoUndo::Undo(AppStateCommand::Changed { from: to, to: from })) = command;
        if *self != **from {
            return Err(CommandError::MismatchedState);
        }
        *self = AppState::clone(to);
        Ok(())
    }
}

impl CommandConsumer<Command> for Scene {
    fn apply(&mut self, command: DoUndo<'_, Command>) -> Result<(), CommandError> {
        let undo = matches!(command, DoUndo::Undo(_));
        let (DoUndo::Do(inner) | DoUndo::Undo(inner)) = command;
        match inner {
            Command::Element(element) => self.elements.apply(command.with(element)),
            Command::AppState(app_state) => self.app_state.apply(command.with(app_state)),
            Command::Meta(MetaCommand::Scope(_, commands)) => {
                // Undo a scope back-to-front.
                let ordered: Vec<&Command> = if undo {
                    commands.iter().rev().collect()
                } else {
                    commands.iter().collect()
                };
                for (applied, sub) in ordered.iter().enumerate() {
                    if let Err(e) = self.apply(command.with(*sub)) {
                        // Roll back the part of the scope already applied, keeping the
                        // scene as it was before this call.
                        for done in ordered[..applied].iter().rev() {
                            let reverse = if undo {
                                DoUndo::Do(*done)
                            } else {
                                DoUndo::Undo(*done)
                            };
                            // Just applied in the opposite direction, can't mismatch.
                            let _ = self.apply(reverse);
                        }
                        return Err(e);
                    }
                }
                Ok(())
            }
            Command::Meta(MetaCommand::Save(_)) | Command::Dummy => Ok(()),
        }
    }
}
