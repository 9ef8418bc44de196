#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::module_inception)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::too_many_lines)]
#![doc = include_str!("../README.md")]

pub mod backend;
pub mod codec;
pub mod context;
pub mod dynamic;
mod error;
pub mod fix;
pub mod fixer;
pub mod ops;
pub mod optics;
pub mod result;
pub mod rules;
pub mod schema;
pub mod types;
pub mod version;

pub use crate::error::Error;

/// Prelude: convenient import for commonly used items provided by the crate.
#[allow(unused_imports)]
pub mod prelude {
    #[doc(inline)]
    pub use crate::{
        backend::{
            JsonOps,
            Node,
            NodeOps,
        },
        codec::{
            Codec,
            MapCodec,
        },
        context::{
            ContextConfig,
            FixContext,
            MigrationReport,
        },
        dynamic::{
            Dynamic,
            TaggedDynamic,
        },
        error::Error,
        fix::{
            DataFix,
            FunctionFix,
            RuleFix,
        },
        fixer::{
            Bootstrap,
            DataFixer,
            DataFixerBuilder,
            FixRegistrar,
        },
        ops::{
            DynamicOps,
            Number,
        },
        optics::Finder,
        result::DataResult,
        rules::{
            self,
            BoxedRule,
            Rule,
        },
        schema::{
            Schema,
            SchemaRegistry,
        },
        types::{
            DataType,
            TypeFamily,
            TypeTemplate,
            Typed,
        },
        version::{
            DataVersion,
            TypeReference,
        },
    };
}
