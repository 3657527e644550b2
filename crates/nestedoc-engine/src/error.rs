use crate::model::NodeKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The inner surface was released by `destroy`; no further patches may
    /// be applied from either direction.
    #[error("surface has been released")]
    SurfaceReleased,

    #[error("range {start}..{end} is out of bounds for surface of length {len}")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("{kind:?} nodes cannot host a nested surface")]
    UnsupportedNode { kind: NodeKind },
}
