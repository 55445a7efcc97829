//! Memory layout and field promotion for Go-style structs.
//!
//! Build a [`TypeRegistry`], freeze it behind an `Arc`, and hand it to an
//! [`Engine`] for one [`Target`]:
//!
//! ```
//! use std::sync::Arc;
//! use memshape::{Engine, FieldDef, Target, TypeId, TypeRegistry, WordSize};
//!
//! let mut registry = TypeRegistry::new();
//! let base = registry
//!     .add_struct(
//!         "Base",
//!         vec![
//!             FieldDef::new("ID", TypeId::UINT64),
//!             FieldDef::new("CreatedAt", TypeId::INT64),
//!         ],
//!     )
//!     .unwrap();
//!
//! let engine = Engine::new(Arc::new(registry), Target::new(WordSize::Eight));
//! let layout = engine.layout(base).unwrap();
//! assert_eq!((layout.size(), layout.align()), (16, 8));
//! ```

mod engine;

use std::sync::Once;

pub use engine::{Engine, Error};

pub use memshape_layout::{
    analysis, layout, struct_report, CacheLineReport, ExportReport, FieldReport, FieldSlot, Layout,
    LayoutCache, LayoutCx, LayoutError, LayoutFlags, StructReport,
};
pub use memshape_promote::{
    access, access_promoted, resolve_path, resolve_selectors, AccessError, Accessed, ResolveError,
    Selector, SelectorEntry, SelectorError, SelectorPath, SelectorTable, SelectorTarget, Value,
    ValueError,
};
pub use memshape_types::{
    Arch, DescriptorKind, FieldDef, PrimitiveKind, PrimitiveTable, SizeAlign, Target, TargetError,
    TypeError, TypeId, TypeKind, TypeRegistry, UnknownPrimitiveKind, WordSize, ARCH_ENV_VAR,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Call this early in main or tests to enable tracing.
/// Only initializes once (subsequent calls are no-ops).
///
/// Set `RUST_LOG=memshape_layout=debug` for cache misses and cycle
/// failures, or `RUST_LOG=memshape_layout=trace` for per-field placement.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
