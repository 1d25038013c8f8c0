//! Frame encoding handles.
//!
//! Contexts clear their drawing buffer and then let every scene node record its
//! own passes through these handles. The pool never looks at what is drawn.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
