//! Quadruple stores.
//!
//! [`Store`] is the uniform selection contract the query engine runs
//! against. [`MemoryStore`] keeps quadruples in memory; [`Federation`] is an
//! ordered list of stores queried together.
//!
//! Backed implementations persist into a `Quadruples` table
//! (`QuadrupleID INT64 PK, TripleFlavor INT, Context STRING, ContextID
//! INT64, Subject STRING, SubjectID INT64, Predicate STRING, PredicateID
//! INT64, Object STRING, ObjectID INT64`), unique on `QuadrupleID` and
//! indexed by the component id columns. Batch operations there run in a
//! single transaction that commits on success and rolls back on any
//! failure; the connection is released on both paths.

use crate::error::StoreResult;
use crate::graph::Graph;
use crate::term::{Resource, Term};
use crate::triple::Quadruple;

mod federation;
mod memory;

pub use federation::Federation;
pub use memory::MemoryStore;

/// The operations every quadruple store exposes. Each call is atomic.
pub trait Store {
    /// Insert a quadruple; returns whether it was new.
    fn add_quadruple(&mut self, q: Quadruple) -> StoreResult<bool>;

    /// Remove a quadruple; returns whether it was present.
    fn remove_quadruple(&mut self, q: &Quadruple) -> StoreResult<bool>;

    /// Remove every quadruple in the given context; returns how many went.
    fn remove_by_context(&mut self, context: &Resource) -> StoreResult<usize>;

    fn remove_by_subject(&mut self, subject: &Resource) -> StoreResult<usize>;

    fn remove_by_predicate(&mut self, predicate: &Resource) -> StoreResult<usize>;

    /// Remove every quadruple whose object is the given resource.
    fn remove_by_object(&mut self, object: &Resource) -> StoreResult<usize>;

    /// Remove every quadruple whose object is the given literal. A
    /// non-literal argument removes nothing.
    fn remove_by_literal(&mut self, literal: &Term) -> StoreResult<usize>;

    fn clear(&mut self) -> StoreResult<()>;

    fn contains(&self, q: &Quadruple) -> StoreResult<bool>;

    /// Quadruples matching every given component; `None` is a wildcard.
    /// `object` matches resource objects, `literal` matches literal objects.
    fn select_quadruples(
        &self,
        context: Option<&Resource>,
        subject: Option<&Resource>,
        predicate: Option<&Resource>,
        object: Option<&Resource>,
        literal: Option<&Term>,
    ) -> StoreResult<Vec<Quadruple>>;

    /// One graph per distinct context, holding that context's triples.
    fn extract_graphs(&self) -> StoreResult<Vec<Graph>>;

    /// Add every triple of `graph` under the graph's context.
    fn merge_graph(&mut self, graph: &Graph) -> StoreResult<()>;
}
