use crate::browser;
use crate::engine::Engine;
use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

/// What the router needs from a key event besides handing it to the engine
pub trait KeyEvent {
    fn is_key_down(&self) -> bool;
    /// Stops the browser's own reaction, e.g. arrow keys scrolling the page
    fn suppress_default(&self);
}

impl KeyEvent for KeyboardEvent {
    fn is_key_down(&self) -> bool {
        self.type_() == KEY_DOWN
    }

    fn suppress_default(&self) {
        self.prevent_default();
    }
}

const KEY_DOWN: &str = "keydown";
const KEY_UP: &str = "keyup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// engine used the key, default action suppressed
    Consumed,
    /// browser keeps its default action
    Ignored,
}

/// Hands one key event to the engine
/// - no filtering, repeats and modifiers are the engine's business
pub fn route<E>(engine: &RefCell<E>, event: &E::Event) -> Disposition
where
    E: Engine,
    E::Event: KeyEvent,
{
    let consumed = engine
        .borrow_mut()
        .on_keyboard_event(event, event.is_key_down());
    if consumed {
        event.suppress_default();
        Disposition::Consumed
    } else {
        Disposition::Ignored
    }
}

/// Subscribes the engine to document level keydown and keyup for the rest of
/// the session
pub fn attach<E>(engine: Rc<RefCell<E>>) -> Result<()>
where
    E: Engine<Event = KeyboardEvent> + 'static,
{
    let document = browser::document()?;
    for event_type in [KEY_DOWN, KEY_UP] {
        let engine = engine.clone();
        let handler = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            route(&engine, &event);
        }) as Box<dyn FnMut(KeyboardEvent)>);

        document
            .add_event_listener_with_callback(event_type, handler.as_ref().unchecked_ref())
            .map_err(|err| anyhow!("Could not listen to {} : {:#?}", event_type, err))?;
        // listeners stay for the page lifetime
        handler.forget();
    }
    Ok(())
}
