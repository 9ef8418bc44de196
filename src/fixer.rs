//! The fixer driver: selects the fixes bridging two versions and threads a
//! dynamic through them.

use std::{
    collections::HashMap,
    sync::Arc,
    time::Instant,
};

use tracing::debug;

use crate::{
    context::{
        ContextConfig,
        FixContext,
    },
    dynamic::{
        Dynamic,
        TaggedDynamic,
    },
    error::Error,
    fix::DataFix,
    ops::DynamicOps,
    schema::{
        Schema,
        SchemaRegistry,
    },
    version::{
        DataVersion,
        TypeReference,
    },
};

/// The published fixer: immutable fix and schema tables plus the driver
/// algorithm. Safe to share across threads; diagnostics are scoped to each
/// call's [`FixContext`].
pub struct DataFixer<O: DynamicOps> {
    current_version: DataVersion,
    schemas: SchemaRegistry,
    fixes: HashMap<TypeReference, Vec<Arc<dyn DataFix<O>>>>,
    default_context: ContextConfig<O>,
}

impl<O: DynamicOps> DataFixer<O> {
    /// Migrates a dynamic from `from` to `to`, using a default context.
    ///
    /// All registered fixes for `reference` whose interval lies inside
    /// `[from, to]` run in ascending `from_version` order, ties broken by
    /// registration order. Version ranges not covered by any fix are
    /// silently skipped.
    ///
    /// # Errors
    /// [`Error::Downgrade`] if `from > to`.
    pub fn update(
        &self,
        reference: &TypeReference,
        input: Dynamic<O>,
        from: DataVersion,
        to: DataVersion,
    ) -> Result<Dynamic<O>, Error> {
        let ctx = self.default_context.build();
        self.update_with(reference, input, from, to, &ctx)
    }

    /// Migrates a dynamic with a caller-supplied context.
    ///
    /// # Errors
    /// [`Error::Downgrade`] if `from > to`.
    pub fn update_with(
        &self,
        reference: &TypeReference,
        input: Dynamic<O>,
        from: DataVersion,
        to: DataVersion,
        ctx: &FixContext<O>,
    ) -> Result<Dynamic<O>, Error> {
        if from > to {
            return Err(Error::Downgrade { from, to });
        }
        if from == to {
            return Ok(input);
        }

        let Some(registered) = self.fixes.get(reference) else {
            return Ok(input);
        };

        let mut selected: Vec<&Arc<dyn DataFix<O>>> = registered
            .iter()
            .filter(|fix| fix.from_version() >= from && fix.to_version() <= to)
            .collect();
        // Stable: ties keep registration order.
        selected.sort_by_key(|fix| fix.from_version());

        let mut current = input;
        for fix in selected {
            let started = Instant::now();
            let before = if ctx.is_recording() {
                ctx.snapshot(&current)
            } else {
                None
            };
            ctx.begin_fix(fix.name(), fix.from_version(), fix.to_version(), before);

            current = fix.apply(reference, current, ctx);

            let after = if ctx.is_recording() {
                ctx.snapshot(&current)
            } else {
                None
            };
            ctx.end_fix(after);
            debug!(
                target: "datafix",
                fix = fix.name(),
                from = %fix.from_version(),
                to = %fix.to_version(),
                elapsed = ?started.elapsed(),
                "applied fix",
            );
        }

        Ok(current)
    }

    /// Migrates a tagged dynamic using its own type tag.
    ///
    /// # Errors
    /// [`Error::Downgrade`] if `from > to`.
    pub fn update_tagged(
        &self,
        input: TaggedDynamic<O>,
        from: DataVersion,
        to: DataVersion,
    ) -> Result<TaggedDynamic<O>, Error> {
        let (reference, dynamic) = input.into_parts();
        let updated = self.update(&reference, dynamic, from, to)?;
        Ok(TaggedDynamic::new(reference, updated))
    }

    /// The version this fixer migrates data up to.
    pub fn current_version(&self) -> DataVersion {
        self.current_version
    }

    /// Read-only view of the registered schemas.
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }
}

/// Builder for [`DataFixer`]. Fixes and schemas are registered at startup;
/// the published fixer is immutable.
pub struct DataFixerBuilder<O: DynamicOps> {
    current_version: DataVersion,
    schemas: SchemaRegistry,
    fixes: HashMap<TypeReference, Vec<Arc<dyn DataFix<O>>>>,
    default_context: ContextConfig<O>,
}

impl<O: DynamicOps> DataFixerBuilder<O> {
    /// Starts building a fixer targeting `current_version`.
    pub fn new(current_version: DataVersion) -> Self {
        Self {
            current_version,
            schemas: SchemaRegistry::new(),
            fixes: HashMap::new(),
            default_context: ContextConfig::new(),
        }
    }

    /// Registers a schema.
    pub fn add_schema(mut self, schema: Schema) -> Self {
        self.schemas.register(schema);
        self
    }

    /// Registers a fix for a data kind.
    ///
    /// # Panics
    /// If the fix's interval is not ascending.
    pub fn add_fix(mut self, reference: TypeReference, fix: impl DataFix<O> + 'static) -> Self {
        push_fix(&mut self.fixes, reference, Arc::new(fix));
        self
    }

    /// Installs the context settings used when a caller omits a context.
    pub fn with_default_context(mut self, config: ContextConfig<O>) -> Self {
        self.default_context = config;
        self
    }

    /// Runs a [`Bootstrap`], registering its schemas and fixes.
    pub fn bootstrap(mut self, bootstrap: &impl Bootstrap<O>) -> Self {
        bootstrap.register_schemas(&mut self.schemas);
        let mut registrar = FixRegistrar {
            schemas: &self.schemas,
            fixes: &mut self.fixes,
        };
        bootstrap.register_fixes(&mut registrar);
        self
    }

    /// Publishes the fixer.
    pub fn build(self) -> DataFixer<O> {
        DataFixer {
            current_version: self.current_version,
            schemas: self.schemas,
            fixes: self.fixes,
            default_context: self.default_context,
        }
    }
}

fn push_fix<O: DynamicOps>(
    fixes: &mut HashMap<TypeReference, Vec<Arc<dyn DataFix<O>>>>,
    reference: TypeReference,
    fix: Arc<dyn DataFix<O>>,
) {
    assert!(
        fix.from_version() < fix.to_version(),
        "Fix interval must be ascending: {} -> {}",
        fix.from_version(),
        fix.to_version(),
    );
    fixes.entry(reference).or_default().push(fix);
}

/// The registration surface handed to a [`Bootstrap`].
pub struct FixRegistrar<'a, O: DynamicOps> {
    schemas: &'a SchemaRegistry,
    fixes: &'a mut HashMap<TypeReference, Vec<Arc<dyn DataFix<O>>>>,
}

impl<O: DynamicOps> FixRegistrar<'_, O> {
    /// Registers a fix for a data kind.
    ///
    /// # Panics
    /// If the fix's interval is not ascending.
    pub fn add_fix(&mut self, reference: TypeReference, fix: impl DataFix<O> + 'static) {
        push_fix(self.fixes, reference, Arc::new(fix));
    }

    /// The schema governing `version`, for authors that need to reference a
    /// previously registered schema when constructing a fix.
    pub fn get_schema(&self, version: DataVersion) -> Option<&Schema> {
        self.schemas.schema_for(version)
    }
}

/// A side-effect-free object that registers schemas and fixes at startup.
pub trait Bootstrap<O: DynamicOps> {
    /// Registers this bootstrap's schemas.
    fn register_schemas(&self, registry: &mut SchemaRegistry);

    /// Registers this bootstrap's fixes.
    fn register_fixes(&self, registrar: &mut FixRegistrar<'_, O>);
}
