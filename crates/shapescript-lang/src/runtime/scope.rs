//! Scope frames for parameters, shapes, layers and functions.
//!
//! Frames live in an arena; each one points at its lexical parent by index
//! and lookups walk that chain up to the global frame (index 0). Frames are
//! pushed and popped in stack order, so the current frame is always the last.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use crate::error::{Error, NameKind, Result};
use crate::runtime::value::Value;
use crate::syntax::ast::Stmt;
use crate::types::layer::Layer;
use crate::types::shape::{Qualifier, Shape, ShapeId};

pub const GLOBAL: usize = 0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDef {
    pub params: Vec<String>,
    #[serde(skip)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Default)]
struct Frame {
    parent: Option<usize>,
    parameters: BTreeMap<String, Value>,
    shapes: BTreeMap<ShapeId, Shape>,
    layers: BTreeMap<String, Layer>,
    functions: BTreeMap<String, Rc<FunctionDef>>,
}

/// Contents of the global frame once a run is over.
#[derive(Debug, Default)]
pub struct GlobalBindings {
    pub parameters: BTreeMap<String, Value>,
    pub shapes: BTreeMap<ShapeId, Shape>,
    pub layers: BTreeMap<String, Layer>,
    pub functions: BTreeMap<String, FunctionDef>,
}

#[derive(Debug)]
pub struct ScopeEngine {
    frames: Vec<Frame>,
}

impl Default for ScopeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeEngine {
    pub fn new() -> Self {
        Self { frames: vec![Frame::default()] }
    }

    pub fn current(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Enter a new frame whose lookups fall back to `parent`.
    pub fn push_scope(&mut self, parent: usize) -> usize {
        assert!(parent < self.frames.len(), "parent frame {parent} does not exist");
        self.frames.push(Frame { parent: Some(parent), ..Frame::default() });
        self.current()
    }

    /// Leave the current frame. Popping the global frame is a caller bug.
    pub fn pop_scope(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the global scope");
        self.frames.pop();
    }

    /// Frame indices from the current frame up to the global one.
    fn chain(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(self.current()), |&i| self.frames[i].parent)
    }

    fn find_frame(&self, hit: impl Fn(&Frame) -> bool) -> Option<usize> {
        self.chain().find(|&i| hit(&self.frames[i]))
    }

    fn current_frame(&mut self) -> &mut Frame {
        let i = self.current();
        &mut self.frames[i]
    }

    // ─── Parameters ──────────────────────────────────────────────────────────

    pub fn get_parameter(&self, name: &str) -> Result<&Value> {
        self.find_frame(|f| f.parameters.contains_key(name))
            .and_then(|i| self.frames[i].parameters.get(name))
            .ok_or_else(|| Error::name(NameKind::Parameter, name))
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.find_frame(|f| f.parameters.contains_key(name)).is_some()
    }

    /// Bind in the current frame, shadowing any outer binding.
    pub fn set_parameter(&mut self, name: &str, value: Value) {
        self.current_frame().parameters.insert(name.to_string(), value);
    }

    // ─── Shapes ──────────────────────────────────────────────────────────────

    pub fn get_shape(&self, id: &ShapeId) -> Result<&Shape> {
        self.find_frame(|f| f.shapes.contains_key(id))
            .and_then(|i| self.frames[i].shapes.get(id))
            .ok_or_else(|| Error::name(NameKind::Shape, id.to_string()))
    }

    pub fn get_shape_mut(&mut self, id: &ShapeId) -> Result<&mut Shape> {
        match self.find_frame(|f| f.shapes.contains_key(id)) {
            Some(i) => self.frames[i].shapes.get_mut(id).ok_or_else(|| Error::name(NameKind::Shape, id.to_string())),
            None => Err(Error::name(NameKind::Shape, id.to_string())),
        }
    }

    pub fn has_shape(&self, id: &ShapeId) -> bool {
        self.find_frame(|f| f.shapes.contains_key(id)).is_some()
    }

    /// Register in the current frame under an id qualified by the active loop
    /// counters.
    pub fn add_shape_in_current(&mut self, id: ShapeId, shape: Shape) {
        self.current_frame().shapes.insert(id, shape);
    }

    /// Register in the global frame whatever the current depth, so shapes
    /// built inside function calls outlive the call.
    pub fn add_shape_global(&mut self, id: ShapeId, shape: Shape) {
        self.frames[GLOBAL].shapes.insert(id, shape);
    }

    /// Resolve a name written in the script to a registered shape id.
    ///
    /// Tries the name qualified by the active context, dropping innermost
    /// qualifiers one at a time down to the plain name, then any id that
    /// renders to exactly `name` (`s_2` written out by hand).
    pub fn resolve_shape(&self, name: &str, qualifiers: &[Qualifier]) -> Option<ShapeId> {
        for n in (0..=qualifiers.len()).rev() {
            let id = ShapeId::qualified(name, &qualifiers[..n]);
            if self.has_shape(&id) {
                return Some(id);
            }
        }
        self.chain()
            .flat_map(|i| self.frames[i].shapes.keys())
            .find(|id| id.to_string() == name)
            .cloned()
    }

    // ─── Layers ──────────────────────────────────────────────────────────────

    pub fn get_layer(&self, name: &str) -> Result<&Layer> {
        self.find_frame(|f| f.layers.contains_key(name))
            .and_then(|i| self.frames[i].layers.get(name))
            .ok_or_else(|| Error::name(NameKind::Layer, name))
    }

    pub fn get_layer_mut(&mut self, name: &str) -> Result<&mut Layer> {
        match self.find_frame(|f| f.layers.contains_key(name)) {
            Some(i) => self.frames[i].layers.get_mut(name).ok_or_else(|| Error::name(NameKind::Layer, name)),
            None => Err(Error::name(NameKind::Layer, name)),
        }
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.find_frame(|f| f.layers.contains_key(name)).is_some()
    }

    pub fn set_layer(&mut self, layer: Layer) {
        self.current_frame().layers.insert(layer.name.clone(), layer);
    }

    // ─── Functions ───────────────────────────────────────────────────────────

    /// Redefinition in the same frame overwrites.
    pub fn define_function(&mut self, name: &str, def: FunctionDef) {
        self.current_frame().functions.insert(name.to_string(), Rc::new(def));
    }

    /// The definition and the frame it was found in; a call's frame uses
    /// that frame as its parent.
    pub fn get_function(&self, name: &str) -> Result<(Rc<FunctionDef>, usize)> {
        self.find_frame(|f| f.functions.contains_key(name))
            .and_then(|i| self.frames[i].functions.get(name).map(|f| (Rc::clone(f), i)))
            .ok_or_else(|| Error::name(NameKind::Function, name))
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.find_frame(|f| f.functions.contains_key(name)).is_some()
    }

    // ─── Output ──────────────────────────────────────────────────────────────

    /// Drop every frame and hand back the global bindings.
    pub fn into_global(mut self) -> GlobalBindings {
        self.frames.truncate(1);
        let global = self.frames.swap_remove(GLOBAL);
        GlobalBindings {
            parameters: global.parameters,
            shapes: global.shapes,
            layers: global.layers,
            functions: global.functions.into_iter()
                .map(|(name, def)| (name, Rc::unwrap_or_clone(def)))
                .collect(),
        }
    }
}
