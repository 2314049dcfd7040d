//! Compiler-wide configuration: a small, serializable knob set controlling
//! the emitter, rather than a pile of function parameters.

use serde::{Deserialize, Serialize};

/// Controls the textual shape the emitter produces. Defaults match §6's
/// `ZSetHashMap<Tuple, Weight>` / `Weight = isize`-via-opaque-host-type
/// arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Name of the host Z-set element type the emitter references in
    /// Source/Sink type annotations (§6: `ZSetHashMap<Tuple, Weight>`).
    /// Overridable so a caller targeting a differently-named host
    /// collection type doesn't need a second emitter.
    pub zset_type_name: String,
    /// Name the emitted preamble aliases the opaque weight type to.
    pub weight_type_name: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            zset_type_name: "ZSetHashMap".to_string(),
            weight_type_name: "Weight".to_string(),
        }
    }
}
