//! Tekton parameter handling.
//!
//! Resolves declared [`ParamSpec`]s against provided [`Param`]s and expands
//! `$(params.name)` references in task fields the way the Tekton controller
//! does: string references are replaced in place, a field that is exactly one
//! whole-array reference (`$(params.name[*])`) expands into the array's
//! elements.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`params`] | Param types, values and default resolution |
//! | [`substitution`] | Replacement tables, `$(...)` expansion, reference checks |

pub mod params;
pub mod substitution;

pub use params::{resolve_params, Param, ParamSpec, ParamType, ParamValue, SubstitutionError};
pub use substitution::{
    apply_array_replacements, apply_replacements, apply_to_args, param_references,
    validate_references, Replacements,
};
