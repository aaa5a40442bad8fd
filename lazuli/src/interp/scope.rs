//! Scope stack: frames, blocks, and structural snapshots

use std::collections::HashMap;
use std::rc::Rc;

use super::thunk::Thunk;
use super::value::Value;

/// What a name is bound to: a settled value or a pending thunk.
#[derive(Debug, Clone)]
pub enum Binding<'p> {
    Value(Value),
    Thunk(Thunk<'p>),
}

/// One name-to-binding mapping.
type Block<'p> = HashMap<String, Binding<'p>>;

/// All blocks of one function activation, innermost last.
type Frame<'p> = Vec<Block<'p>>;

/// The live scope: a stack of call frames, each holding a stack of blocks.
///
/// Name resolution never crosses a frame boundary; a callee cannot see its
/// caller's variables. Within a frame, inner blocks shadow outer ones.
#[derive(Debug)]
pub struct ScopeStack<'p> {
    frames: Vec<Frame<'p>>,
}

impl<'p> ScopeStack<'p> {
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![vec![Block::new()]],
        }
    }

    /// Enter a function activation. The fresh frame starts with one block
    /// that will hold the formal parameters.
    pub fn push_frame(&mut self) {
        self.frames.push(vec![Block::new()]);
    }

    /// Leave a function activation.
    ///
    /// Panics when asked to pop the base frame; the evaluator pairs every
    /// push with exactly one pop.
    pub fn pop_frame(&mut self) {
        if self.frames.len() <= 1 {
            panic!("cannot pop the base frame");
        }
        self.frames.pop();
    }

    /// Enter a nested block in the current frame.
    pub fn push_block(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(Block::new());
        }
    }

    /// Leave the innermost block of the current frame.
    ///
    /// Panics when asked to pop a frame's parameter block.
    pub fn pop_block(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.len() <= 1 {
                panic!("cannot pop a frame's parameter block");
            }
            frame.pop();
        }
    }

    /// Binds a new name in the innermost block of the current frame.
    /// Returns false when that block already has the name; shadowing an
    /// outer block is fine.
    pub fn declare(&mut self, name: &str, binding: Binding<'p>) -> bool {
        if let Some(block) = self.frames.last_mut().and_then(|frame| frame.last_mut()) {
            if block.contains_key(name) {
                return false;
            }
            block.insert(name.to_string(), binding);
            true
        } else {
            false
        }
    }

    /// Replaces the binding of a name already visible in the current
    /// frame, nearest block first. Returns false when no block of the
    /// frame has it; enclosing frames are never consulted.
    pub fn rebind(&mut self, name: &str, binding: Binding<'p>) -> bool {
        if let Some(frame) = self.frames.last_mut() {
            for block in frame.iter_mut().rev() {
                if block.contains_key(name) {
                    block.insert(name.to_string(), binding);
                    return true;
                }
            }
        }
        false
    }

    /// Resolves a name against the current frame, innermost block first.
    pub fn lookup(&self, name: &str) -> Option<Binding<'p>> {
        self.frames.last().and_then(|frame| lookup_in(frame, name))
    }

    /// Takes a structural copy of the whole stack: new frame and block
    /// structure, bindings shared with the live stack. Rebinding a name on
    /// either side afterwards leaves the other side alone, while forcing a
    /// shared thunk is observed by both.
    pub fn snapshot(&self) -> ScopeSnapshot<'p> {
        ScopeSnapshot {
            frames: Rc::new(self.frames.clone()),
        }
    }

    /// Number of active frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for ScopeStack<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable structural copy of a [`ScopeStack`] taken at one instant.
///
/// Cloning a snapshot is cheap and shares the copy; this is what lets all
/// argument thunks of one call carry the same capture.
#[derive(Debug, Clone)]
pub struct ScopeSnapshot<'p> {
    frames: Rc<Vec<Frame<'p>>>,
}

impl<'p> ScopeSnapshot<'p> {
    /// Resolves a name against the frame that was current at capture time,
    /// innermost block first. Frames below it stay invisible, exactly as
    /// they are for live lookup.
    pub fn lookup(&self, name: &str) -> Option<Binding<'p>> {
        self.frames.last().and_then(|frame| lookup_in(frame, name))
    }
}

fn lookup_in<'p>(frame: &Frame<'p>, name: &str) -> Option<Binding<'p>> {
    for block in frame.iter().rev() {
        if let Some(binding) = block.get(name) {
            return Some(binding.clone());
        }
    }
    None
}
