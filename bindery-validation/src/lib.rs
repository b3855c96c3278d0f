//! Validation collaborator for Bindery
//!
//! Every payload bound through `bindery_core::Bind<T>` is validated after it
//! has been deserialized. Types opt in by implementing [`Validate`]; an empty
//! `impl Validate for T {}` accepts every value.
//!
//! # Examples
//!
//! ```
//! use bindery_validation::{Checks, Validate, ValidationErrors, rules};
//!
//! struct SignUp {
//!     name: String,
//!     email: String,
//!     age: i64,
//! }
//!
//! impl Validate for SignUp {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         Checks::new()
//!             .check(rules::not_empty(&self.name, "name"))
//!             .check(rules::email(&self.email, "email"))
//!             .check(rules::in_range(self.age, 18, 130, "age"))
//!             .finish()
//!     }
//! }
//!
//! let input = SignUp {
//!     name: "Ada".to_string(),
//!     email: "ada@example.com".to_string(),
//!     age: 36,
//! };
//! assert!(input.validate().is_ok());
//! ```
//!
//! ## Field rule sets
//!
//! ```
//! use bindery_validation::{FieldRules, rules};
//!
//! let username = FieldRules::for_field("username")
//!     .add(rules::not_empty)
//!     .add(|value, field| rules::min_length(value, 3, field));
//!
//! assert!(username.validate("ada").is_ok());
//! assert_eq!(username.validate("").unwrap_err().len(), 2);
//! ```

mod errors;
mod field;
mod traits;

pub mod rules;

pub use errors::*;
pub use field::*;
pub use traits::*;
