/*!
 * # Nested-surface editing core
 *
 * This module keeps two independently editable representations of the same
 * logical content consistent under arbitrary, incremental, bidirectional
 * edits, and materializes typed text patterns into atomic nodes.
 *
 * ## Architecture
 *
 * ### 1. One inner surface per node
 * - Each hosting node gets a [`Surface`]: a self-contained editable document
 *   over a projection of the node's content, stored in an `xi_rope::Rope`
 * - Edits are commands ([`Cmd`]) compiled to deltas and applied atomically,
 *   returning a [`Patch`] with changed ranges, selection and version
 *
 * ### 2. Diff-based synchronization
 * - Both propagation directions are decided by one primitive:
 *   [`diff::diff`] computes the minimal divergence window between the two
 *   representations, and only that window is patched
 * - Inner windows are translated to outer coordinates through
 *   [`mapping`], offset by the node's base position plus one boundary unit
 *
 * ### 3. Loop prevention via tagged dispatch
 * - Every boundary-crossing patch carries an [`EditSource`] tag; `Local`
 *   edits are pushed outward through the [`OuterAccessor`], `Propagated`
 *   edits stop at the inner buffer
 * - All patches flow through a single synchronization function in
 *   [`SurfaceController`], so the invariant holds in one place
 *
 * ### 4. Deferred structural conversion
 * - The marker prefix (`#`-run plus whitespace) exists only inside the
 *   inner surface while editing; [`markers`] parses it and infers the
 *   bounded structural level
 * - Structural changes (level update, conversion to paragraph) happen only
 *   on blur, never per keystroke
 *
 * ### 5. Materialization
 * - [`RuleSet`] matches trailing typed input against registered
 *   [`PatternRule`]s with guard predicates; the first passing rule replaces
 *   the matched span with a new atomic node
 *
 * ## Module structure
 *
 * - **`diff`**: minimal divergence window with overlap correction
 * - **`mapping`**: outer/inner coordinate translation and click resolution
 * - **`markers`**: marker-prefix parsing and level inference
 * - **`surface`**: the inner editable surface over a rope buffer
 * - **`rules`**: pattern-triggered materialization engine
 * - **`controller`**: per-node lifecycle and bidirectional synchronization
 */

pub mod controller;
pub mod diff;
pub mod mapping;
pub mod markers;
pub mod rules;
pub mod surface;

pub use controller::{EditSource, GetPos, OuterAccessor, SurfaceController, SurfaceEvent};
pub use diff::{DiffWindow, diff};
pub use rules::{Materialization, PatternRule, RuleSet, SelectAfter, default_rules, formula_rule};
pub use surface::{Cmd, Patch, Surface, SurfaceId};
