//! Host event handling
//!
//! The host raises three events while it builds and renders a form. Each
//! has its own argument struct; the caches every handler shares live in a
//! [`PreparationContext`] that the host creates for one form preparation
//! and drops afterwards.

use crate::config::PluginConfig;
use crate::error::Result;
use crate::form::{Field, FieldAttribute, FormModel};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::showon::should_display;
use crate::snapshot::{ItemRef, SnapshotCache, ValueSnapshotProvider};
use crate::subform::{rewrite_form_source, NameMap, ShowOnRewriter};
use serde::{Deserialize, Serialize};

/// Context prefix of forms that edit a custom field definition
pub const FIELD_DEFINITION_PREFIX: &str = "com_fields.field.";

/// Where the showon parameter is added on a field definition form
pub const SHOWON_PARAM_GROUP: &str = "params";
pub const SHOWON_PARAM_FIELD_SET: &str = "basic";

/// Caches scoped to a single form preparation
#[derive(Debug, Default)]
pub struct PreparationContext {
    pub names: NameMap,
    pub snapshots: SnapshotCache,
}

impl PreparationContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A form is being prepared for an item
pub struct PrepareFormEvent<'a, M: FormModel + ?Sized> {
    pub form: &'a mut M,
    pub item: &'a ItemRef,
}

/// A custom field of an item is about to be rendered for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayField {
    pub name: String,
    /// The showon parameter saved with the field definition
    #[serde(default)]
    pub showon: String,
    #[serde(default = "display_default")]
    pub display: bool,
}

fn display_default() -> bool {
    true
}

pub struct BeforePrepareFieldEvent<'a> {
    pub context: &'a str,
    pub item: &'a ItemRef,
    pub field: &'a mut DisplayField,
}

/// The host created the element of a field rendered inside a subform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubformFieldElement {
    /// Synthetic name, e.g. `field42`
    pub name: String,
    /// Name declared with the custom field, if any
    #[serde(default)]
    pub fieldname: Option<String>,
}

pub struct PrepareDomEvent<'a> {
    pub field: &'a SubformFieldElement,
}

/// What a form preparation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// The context belongs to a disabled component
    Skipped,
    /// A field definition form received the showon parameter
    DefinitionExtended,
    /// A usage form was reconciled
    Reconciled(ReconcileReport),
}

/// Showon event handler
#[derive(Debug, Clone)]
pub struct ShowOnPlugin<P> {
    config: PluginConfig,
    provider: P,
}

impl<P: ValueSnapshotProvider> ShowOnPlugin<P> {
    pub fn new(config: PluginConfig, provider: P) -> Self {
        Self { config, provider }
    }

    /// Handle form preparation.
    ///
    /// On a field definition form this adds the showon parameter. On any
    /// other form it reworks subform definitions with the names collected so
    /// far, then reconciles the custom fields against the item's values.
    pub fn on_content_prepare_form<M>(
        &self,
        ctx: &mut PreparationContext,
        event: PrepareFormEvent<'_, M>,
    ) -> Result<PrepareOutcome>
    where
        M: FormModel + ?Sized,
    {
        let PrepareFormEvent { form, item } = event;
        let context = form.name();

        if context.starts_with(FIELD_DEFINITION_PREFIX) {
            if self
                .config
                .is_definition_disabled(&context, FIELD_DEFINITION_PREFIX)
            {
                tracing::debug!(%context, "showon disabled for component");
                return Ok(PrepareOutcome::Skipped);
            }
            form.add_field(
                Field::new("showon").with_name("jform[params][showon]"),
                SHOWON_PARAM_GROUP,
                SHOWON_PARAM_FIELD_SET,
            );
            return Ok(PrepareOutcome::DefinitionExtended);
        }

        if self.config.is_disabled(&context) {
            tracing::debug!(%context, "showon disabled for component");
            return Ok(PrepareOutcome::Skipped);
        }

        let group = self.config.fields_group.as_str();
        self.rework_subforms(&ctx.names, &mut *form, group)?;

        let snapshot = ctx
            .snapshots
            .get_or_load(&self.provider, &context, item)?;
        let report = reconcile(form, snapshot, group).inspect_err(|err| {
            tracing::warn!(%context, error = %err, "showon reconciliation failed");
        })?;

        tracing::info!(
            %context,
            passes = report.passes,
            removed = report.removed.len(),
            blanked = report.blanked.len(),
            "prepared showon fields"
        );
        Ok(PrepareOutcome::Reconciled(report))
    }

    /// Decide whether a field is displayed for an item.
    ///
    /// Presence on a form plays no role here; only the stored values count.
    pub fn on_before_prepare_field(
        &self,
        ctx: &mut PreparationContext,
        event: BeforePrepareFieldEvent<'_>,
    ) -> Result<()> {
        let BeforePrepareFieldEvent {
            context,
            item,
            field,
        } = event;

        if self.config.is_disabled(context) {
            return Ok(());
        }
        if field.showon.trim().is_empty() {
            return Ok(());
        }

        let snapshot = ctx.snapshots.get_or_load(&self.provider, context, item)?;
        let visible = should_display(&field.showon, snapshot).inspect_err(|err| {
            tracing::warn!(field = %field.name, error = %err, "rejected showon expression");
        })?;
        if !visible {
            field.display = false;
        }
        Ok(())
    }

    /// Remember the synthetic name of a subform field.
    ///
    /// The host must deliver these before preparing the form that uses them.
    pub fn on_prepare_dom(&self, ctx: &mut PreparationContext, event: PrepareDomEvent<'_>) {
        let element = event.field;
        if let Some(declared) = element.fieldname.as_deref() {
            if ctx.names.record(&element.name, declared) {
                tracing::debug!(rewritten = %element.name, %declared, "recorded subform field name");
            }
        }
    }

    fn rework_subforms<M>(&self, names: &NameMap, form: &mut M, group: &str) -> Result<()>
    where
        M: FormModel + ?Sized,
    {
        let rewriter = ShowOnRewriter::new(names).rejoin_delimiters(self.config.rejoin_delimiters);

        // Every source is rewritten before the form is touched
        let mut rewritten = Vec::new();
        for info in form.field_sets(group) {
            for field in form.field_set(&info.name) {
                let Some(source) = field.formsource.as_deref() else {
                    continue;
                };
                if source.trim().is_empty() {
                    continue;
                }

                let result = rewrite_form_source(field.short_name(), source, &rewriter)
                    .inspect_err(|err| {
                        tracing::warn!(field_set = %info.name, error = %err, "rejected subform source");
                    })?;
                rewritten.push((field.short_name().to_string(), result.source));
            }
        }

        for (name, source) in rewritten {
            if !form.set_field_attribute(&name, FieldAttribute::FormSource, &source, group) {
                tracing::warn!(field = %name, %group, "subform field not found, rewritten source dropped");
            }
        }
        Ok(())
    }
}
