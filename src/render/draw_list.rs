//! Rendering backend capability and an in-memory implementation

use crate::annotation::{Handle, LabelStyle};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Primitive drawing operations a view needs from its host
pub trait RenderBackend {
    fn vertical_line(&mut self, x: f64) -> Handle;
    fn text(&mut self, x: f64, y: f64, text: &str, style: &LabelStyle) -> Handle;
    fn erase(&mut self, handle: Handle);
}

/// Lets a caller keep a handle on a backend that a view owns
impl<B: RenderBackend + ?Sized> RenderBackend for Rc<RefCell<B>> {
    fn vertical_line(&mut self, x: f64) -> Handle {
        self.borrow_mut().vertical_line(x)
    }

    fn text(&mut self, x: f64, y: f64, text: &str, style: &LabelStyle) -> Handle {
        self.borrow_mut().text(x, y, text, style)
    }

    fn erase(&mut self, handle: Handle) {
        self.borrow_mut().erase(handle)
    }
}

/// A live drawn element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    VerticalLine { x: f64 },
    Text { x: f64, y: f64, text: String, rotation: f64 },
}

/// Backend that records live primitives instead of drawing them
#[derive(Debug, Default, Serialize)]
pub struct DrawList {
    #[serde(skip)]
    next: u64,
    live: BTreeMap<Handle, Primitive>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrapped for sharing between a view and its caller
    pub fn shared() -> Rc<RefCell<DrawList>> {
        Rc::new(RefCell::new(DrawList::new()))
    }

    pub fn get(&self, handle: Handle) -> Option<&Primitive> {
        self.live.get(&handle)
    }

    /// Live primitives in draw order
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.live.values()
    }

    /// x of every live vertical line, in draw order
    pub fn line_positions(&self) -> Vec<f64> {
        self.live
            .values()
            .filter_map(|p| match p {
                Primitive::VerticalLine { x } => Some(*x),
                Primitive::Text { .. } => None,
            })
            .collect()
    }

    /// Text of every live label, in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.live
            .values()
            .filter_map(|p| match p {
                Primitive::Text { text, .. } => Some(text.as_str()),
                Primitive::VerticalLine { .. } => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn push(&mut self, primitive: Primitive) -> Handle {
        self.next += 1;
        let handle = Handle(self.next);
        self.live.insert(handle, primitive);
        handle
    }
}

impl RenderBackend for DrawList {
    fn vertical_line(&mut self, x: f64) -> Handle {
        self.push(Primitive::VerticalLine { x })
    }

    fn text(&mut self, x: f64, y: f64, text: &str, style: &LabelStyle) -> Handle {
        self.push(Primitive::Text {
            x,
            y,
            text: text.to_string(),
            rotation: style.rotation,
        })
    }

    fn erase(&mut self, handle: Handle) {
        self.live.remove(&handle);
    }
}
