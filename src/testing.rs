//! Stand-ins for the engine, canvas and keyboard used by the host side tests

use crate::engine::{Engine, LevelIndex, SurfaceDimensions};
use crate::input::KeyEvent;
use crate::level_store::{KeyValueStore, MemoryStore};
use crate::palette::PixelBuffer;
use crate::render_loop::{Surface, TextDisplay};
use anyhow::{anyhow, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Drawing context handed out by `MockSurface`
/// - `generation` counts acquisitions, `size` is the surface size at the time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockContext {
    pub generation: usize,
    pub size: SurfaceDimensions,
}

/// Everything that happened to the mocks, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Resize(SurfaceDimensions),
    Acquire(usize),
    Draw(MockContext),
    Inventory(String),
    Store(String),
    Key { is_key_down: bool },
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

pub struct MockEngine {
    pub starting_level: LevelIndex,
    pub palette: PixelBuffer,
    pub size: SurfaceDimensions,
    pub level: LevelIndex,
    pub consume_keys: bool,
    pub journal: Journal,
}

impl MockEngine {
    pub fn with_size(width: u32, height: u32, journal: &Journal) -> Self {
        let mut engine = MockEngine::construct(palette(), 0).unwrap();
        engine.size = SurfaceDimensions { width, height };
        engine.journal = journal.clone();
        engine
    }
}

impl Engine for MockEngine {
    type Context = MockContext;
    type Event = FakeKey;

    fn construct(palette: PixelBuffer, starting_level: LevelIndex) -> Result<Self> {
        Ok(MockEngine {
            starting_level,
            palette,
            size: SurfaceDimensions::default(),
            level: starting_level,
            consume_keys: false,
            journal: Journal::default(),
        })
    }

    fn width(&self) -> u32 {
        self.size.width
    }

    fn height(&self) -> u32 {
        self.size.height
    }

    fn current_level(&self) -> LevelIndex {
        self.level
    }

    fn draw(&mut self, context: &MockContext) {
        self.journal.borrow_mut().push(Call::Draw(*context));
    }

    fn get_inventory(&self) -> String {
        format!("level: {:02}", self.level + 1)
    }

    fn on_keyboard_event(&mut self, event: &FakeKey, is_key_down: bool) -> bool {
        let _ = event;
        self.journal.borrow_mut().push(Call::Key { is_key_down });
        self.consume_keys
    }
}

pub struct MockSurface {
    pub size: SurfaceDimensions,
    pub acquisitions: Cell<usize>,
    /// next acquire_context() errors once, like a canvas refusing a context
    pub fail_next_acquire: Cell<bool>,
    pub journal: Journal,
}

impl MockSurface {
    pub fn new(width: u32, height: u32, journal: &Journal) -> Self {
        MockSurface {
            size: SurfaceDimensions { width, height },
            acquisitions: Cell::new(0),
            fail_next_acquire: Cell::new(false),
            journal: journal.clone(),
        }
    }
}

impl Surface for MockSurface {
    type Context = MockContext;

    fn dimensions(&self) -> SurfaceDimensions {
        self.size
    }

    fn resize(&mut self, dimensions: SurfaceDimensions) {
        self.journal.borrow_mut().push(Call::Resize(dimensions));
        self.size = dimensions;
    }

    fn acquire_context(&self) -> Result<MockContext> {
        if self.fail_next_acquire.replace(false) {
            return Err(anyhow!("context lost"));
        }
        let generation = self.acquisitions.get() + 1;
        self.acquisitions.set(generation);
        self.journal.borrow_mut().push(Call::Acquire(generation));
        Ok(MockContext {
            generation,
            size: self.size,
        })
    }
}

pub struct MockDisplay {
    pub journal: Journal,
}

impl TextDisplay for MockDisplay {
    fn set_text(&mut self, text: &str) {
        self.journal
            .borrow_mut()
            .push(Call::Inventory(text.to_string()));
    }
}

/// In-memory store that journals writes and can refuse them
pub struct MockStore {
    pub inner: MemoryStore,
    pub fail_writes: bool,
    pub journal: Journal,
}

impl MockStore {
    pub fn new(journal: &Journal) -> Self {
        MockStore {
            inner: MemoryStore::default(),
            fail_writes: false,
            journal: journal.clone(),
        }
    }
}

impl KeyValueStore for MockStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("QuotaExceededError"));
        }
        self.journal.borrow_mut().push(Call::Store(value.to_string()));
        self.inner.set_item(key, value)
    }
}

pub struct FakeKey {
    pub is_key_down: bool,
    pub suppressed: Cell<bool>,
}

impl FakeKey {
    pub fn down() -> Self {
        FakeKey {
            is_key_down: true,
            suppressed: Cell::new(false),
        }
    }

    pub fn up() -> Self {
        FakeKey {
            is_key_down: false,
            suppressed: Cell::new(false),
        }
    }
}

impl KeyEvent for FakeKey {
    fn is_key_down(&self) -> bool {
        self.is_key_down
    }

    fn suppress_default(&self) {
        self.suppressed.set(true);
    }
}

/// 1x1 palette of the background colour
pub fn palette() -> PixelBuffer {
    PixelBuffer::new(1, 1, crate::palette::BACKGROUND.opaque().to_vec()).unwrap()
}
