pub mod editing;
pub mod error;
pub mod model;

// Re-export key types for easier usage
pub use editing::{
    Cmd, DiffWindow, EditSource, Materialization, OuterAccessor, Patch, PatternRule, RuleSet,
    SelectAfter, Surface, SurfaceController, SurfaceEvent, SurfaceId, default_rules, diff,
    formula_rule,
};
pub use error::EngineError;
pub use model::{ATOM_PLACEHOLDER, AtomNode, Attrs, Inline, NodeKind, OuterNode};
