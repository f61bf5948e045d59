//! Valibase
//!
//! Typed validation and record composition for PocketBase collections. Every
//! collection has three schemas: the response shape returned by the store, the
//! create payload and the update payload. Inputs are checked before they are
//! sent, responses are normalized before they are decoded.
//!
//! ## Layout
//!
//! - [`schema`]: the validation engine (kinds, pipes, objects, unions)
//! - [`primitives`]: branded field schemas and their newtypes
//! - [`combinators`]: create/update/response derivation
//! - [`registry`] and [`collections`]: the built-in collections
//! - [`model`]: runtime derivation from a collections export
//! - [`store`]: typed access to a raw record store
//!
//! ```no_run
//! use valibase::{Client, RecordQuery, Todos};
//! # fn demo<S: valibase::RecordStore>(store: S) -> valibase::Result<()> {
//! let client = Client::new(store);
//! let due = client.collection::<Todos>().list(&RecordQuery::new().filter("state = 'Due'"))?;
//! # Ok(())
//! # }
//! ```

pub mod collections;
pub mod combinators;
pub mod config;
pub mod cross_field;
pub mod error;
pub mod model;
pub mod normalize;
pub mod primitives;
pub mod registry;
pub mod schema;
pub mod store;
pub mod url;

pub use collections::{
    AuthOrigins, ExternalAuths, Mfas, Otps, Superusers, SystemFields, Todo, TodoState, Todos, User, Users,
};
pub use combinators::{CollectionKind, CollectionSchemas, SchemaVariant};
pub use config::ValibaseConfig;
pub use error::{FieldPath, Issue, IssueKind, Result, SchemaError, ValidationError};
pub use model::SchemaSet;
pub use registry::{registry, resolve, validate, Collection, CollectionName};
pub use schema::{ObjectSchema, Presence, Schema, Step};
pub use store::{Client, Handle, RecordQuery, RecordStore};
