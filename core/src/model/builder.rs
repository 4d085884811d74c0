#![deny(missing_docs)]

//! # Code Model Builder
//!
//! Turns the schema plus frozen [`CodeOptions`] into a [`CodeModel`]. Every
//! collision is detected here so the writer never sees an inconsistent plan.

use crate::config::{GenerationOptions, PropertyStyle};
use crate::error::{AppError, AppResult};
use crate::model::strategies::{
    BaseClassContext, BaseClassResolver, DefaultBaseClassResolver, IncludeAll, PropertyFilter,
};
use crate::model::value_types::resolve_value_type;
use crate::model::{CodeModel, ContentTypeModel, MixinPropertyRef, PropertyModel, PropertyState};
use crate::naming::{validate_identifier, DefaultNamingStrategy, NamingStrategy};
use crate::options::{CodeOptions, ContentTypeIdentity, ContentTypesCodeOptions};
use crate::schema::{self, ContentKind, ContentTypeDef};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Helper members the writer emits on every generated class, with the
/// parameter list of the methods.
pub const HELPER_MEMBERS: &[(&str, Option<&str>)] = &[
    ("ModelTypeAlias", None),
    ("ModelItemType", None),
    ("GetModelContentType", Some("()")),
    ("GetModelPropertyType", Some("<TValue>(Expression)")),
];

/// Builds [`CodeModel`]s.
pub struct CodeModelBuilder {
    options: GenerationOptions,
    naming: Box<dyn NamingStrategy>,
    property_filter: Box<dyn PropertyFilter>,
    base_class_resolver: Box<dyn BaseClassResolver>,
}

/// Parent and composition links resolved to schema indices.
struct SchemaLinks {
    parents: Vec<Option<usize>>,
    compositions: Vec<Vec<usize>>,
}

impl SchemaLinks {
    fn resolve(types: &[ContentTypeDef]) -> AppResult<Self> {
        let by_id: BTreeMap<i64, usize> =
            types.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

        let mut parents = Vec::with_capacity(types.len());
        let mut compositions = Vec::with_capacity(types.len());
        for ct in types {
            let parent = match ct.parent() {
                Some(id) => Some(*by_id.get(&id).ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Content type '{}' has unknown parent id {}",
                        ct.alias, id
                    ))
                })?),
                None => None,
            };
            parents.push(parent);

            let mut composed = Vec::new();
            for id in &ct.composition_type_ids {
                if *id == ct.id {
                    continue;
                }
                let index = *by_id.get(id).ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Content type '{}' is composed of unknown content type id {}",
                        ct.alias, id
                    ))
                })?;
                if !composed.contains(&index) {
                    composed.push(index);
                }
            }
            compositions.push(composed);
        }

        let links = Self { parents, compositions };
        for (i, ct) in types.iter().enumerate() {
            let mut seen = BTreeSet::from([i]);
            let mut current = links.parents[i];
            while let Some(p) = current {
                if !seen.insert(p) {
                    return Err(AppError::Configuration(format!(
                        "Content type '{}' inherits from itself",
                        ct.alias
                    )));
                }
                current = links.parents[p];
            }
        }
        Ok(links)
    }

    fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.parents[index];
        while let Some(p) = current {
            chain.push(p);
            current = self.parents[p];
        }
        chain
    }
}

impl CodeModelBuilder {
    /// Creates a builder with the default strategies for `options`.
    pub fn new(options: GenerationOptions) -> Self {
        Self {
            naming: Box::new(DefaultNamingStrategy::new(options.clr_name_source)),
            property_filter: Box::new(IncludeAll),
            base_class_resolver: Box::new(DefaultBaseClassResolver),
            options,
        }
    }

    /// Replaces the naming strategy.
    pub fn with_naming(mut self, naming: impl NamingStrategy + 'static) -> Self {
        self.naming = Box::new(naming);
        self
    }

    /// Replaces the property filter.
    pub fn with_property_filter(mut self, filter: impl PropertyFilter + 'static) -> Self {
        self.property_filter = Box::new(filter);
        self
    }

    /// Replaces the base class resolver.
    pub fn with_base_class_resolver(mut self, resolver: impl BaseClassResolver + 'static) -> Self {
        self.base_class_resolver = Box::new(resolver);
        self
    }

    /// The generation options.
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Builds the generation plan.
    ///
    /// Maps the alias-keyed entries of `code_options`, which therefore must
    /// not have been mapped already.
    pub fn build(
        &self,
        types: &[ContentTypeDef],
        mut code_options: CodeOptions,
    ) -> AppResult<CodeModel> {
        schema::validate(types)?;
        let links = SchemaLinks::resolve(types)?;

        // Ignored types take their descendants with them.
        let ignored: Vec<bool> = (0..types.len())
            .map(|i| {
                std::iter::once(i)
                    .chain(links.ancestors(i))
                    .any(|t| code_options.content_types.is_content_type_ignored(&types[t].alias))
            })
            .collect();
        for (ct, _) in types.iter().zip(&ignored).filter(|(_, ignored)| **ignored) {
            debug!(alias = %ct.alias, "Ignoring content type");
        }

        let kept: Vec<usize> = (0..types.len()).filter(|i| !ignored[*i]).collect();
        let model_index: BTreeMap<usize, usize> =
            kept.iter().enumerate().map(|(m, s)| (*s, m)).collect();

        let mut models: Vec<ContentTypeModel> = kept
            .iter()
            .map(|s| self.new_model(&types[*s], &links, *s, &model_index))
            .collect();

        for m in 0..models.len() {
            let mixins = models[m].mixins.clone();
            for mixin in mixins {
                let schema_index = kept[mixin];
                models[mixin].is_mixin = true;
                for ancestor in links.ancestors(schema_index) {
                    if let Some(a) = model_index.get(&ancestor) {
                        models[*a].is_mixin = true;
                    }
                }
            }
        }

        self.assign_clr_names(&mut models, &code_options.content_types)?;

        let alias_map: BTreeMap<String, String> = models
            .iter()
            .map(|m| (m.alias.clone(), m.clr_name.clone()))
            .collect();
        code_options
            .content_types
            .map_content_type_aliases_to_clr_names(&alias_map)?;
        debug!(count = alias_map.len(), "Mapped content type aliases to CLR names");

        let value_type_names = self.value_type_names(types, &ignored, &models);
        for (m, s) in kept.iter().enumerate() {
            let properties = self.build_properties(
                &types[*s],
                &models[m].clr_name,
                &code_options.content_types,
                &value_type_names,
            )?;
            models[m].properties = properties;
        }

        for m in 0..models.len() {
            let refs = self.mixin_properties(m, &models, &code_options.content_types)?;
            models[m].mixin_properties = refs;
        }

        for model in &models {
            check_member_names(model, &models, &self.options)?;
        }

        for (m, s) in kept.iter().enumerate() {
            self.resolve_inheritance(m, &types[*s], &mut models, &code_options);
        }

        let namespace = code_options
            .models_namespace
            .clone()
            .unwrap_or_else(|| self.options.namespace.clone());
        let using_namespaces: BTreeSet<String> = self
            .options
            .using_namespaces
            .iter()
            .chain(&code_options.using_namespaces)
            .filter(|ns| !ns.trim().is_empty())
            .cloned()
            .collect();

        info!(
            types = models.len(),
            ignored = types.len() - models.len(),
            namespace = %namespace,
            "Built code model"
        );

        Ok(CodeModel {
            namespace,
            using_namespaces: using_namespaces.into_iter().collect(),
            types: models,
        })
    }

    fn new_model(
        &self,
        ct: &ContentTypeDef,
        links: &SchemaLinks,
        schema_index: usize,
        model_index: &BTreeMap<usize, usize>,
    ) -> ContentTypeModel {
        let ancestors = links.ancestors(schema_index);
        let parent = links.parents[schema_index].and_then(|p| model_index.get(&p).copied());
        let mixins = links.compositions[schema_index]
            .iter()
            .filter(|c| !ancestors.contains(c))
            .filter_map(|c| model_index.get(c).copied())
            .collect();

        ContentTypeModel {
            id: ct.id,
            alias: ct.alias.clone(),
            kind: ct.kind,
            name: ct.name.clone(),
            description: ct.description.clone(),
            variations: ct.variations,
            clr_name: String::new(),
            is_mixin: false,
            parent,
            mixins,
            properties: Vec::new(),
            mixin_properties: Vec::new(),
            base_class: None,
            user_base_class: None,
            interfaces: Vec::new(),
            interface_bases: Vec::new(),
            omit_constructor: false,
        }
    }

    fn assign_clr_names(
        &self,
        models: &mut [ContentTypeModel],
        options: &ContentTypesCodeOptions,
    ) -> AppResult<()> {
        for model in models.iter_mut() {
            model.clr_name = match options.content_type_clr_name(&model.alias) {
                Some(name) => name.to_string(),
                None => self.naming.content_type_name(&model.alias, &model.name),
            };
            validate_identifier(&model.clr_name, &format!("content type '{}'", model.alias))?;
        }

        let extensions = self.options.property_style.has_extension_methods();
        let mut taken: BTreeMap<String, (String, String)> = BTreeMap::new();
        for model in models.iter() {
            let mut names = vec![model.clr_name.clone()];
            if model.is_mixin {
                names.push(model.interface_name());
            }
            if extensions {
                names.push(model.extensions_name());
            }
            for name in names {
                let entry = (model.alias.clone(), name.clone());
                if let Some((alias, other)) = taken.insert(name.to_lowercase(), entry) {
                    return Err(AppError::Configuration(format!(
                        "CLR name collision: content type '{}' generates '{}' which conflicts with '{}' of content type '{}'",
                        model.alias, name, other, alias
                    )));
                }
            }
        }
        Ok(())
    }

    /// Lowercased alias to the type name a `{model:alias}` placeholder stands for.
    fn value_type_names(
        &self,
        types: &[ContentTypeDef],
        ignored: &[bool],
        models: &[ContentTypeModel],
    ) -> BTreeMap<String, String> {
        let mut names: BTreeMap<String, String> = types
            .iter()
            .zip(ignored)
            .filter(|(_, ignored)| **ignored)
            .map(|(ct, _)| (ct.alias.to_lowercase(), self.base_interface(ct.kind).to_string()))
            .collect();
        names.extend(models.iter().map(|m| (m.alias.to_lowercase(), m.clr_name.clone())));
        names
    }

    fn base_interface(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Element => &self.options.element_base_interface,
            _ => &self.options.content_base_interface,
        }
    }

    fn build_properties(
        &self,
        ct: &ContentTypeDef,
        clr_name: &str,
        options: &ContentTypesCodeOptions,
        value_type_names: &BTreeMap<String, String>,
    ) -> AppResult<Vec<PropertyModel>> {
        let identity = ContentTypeIdentity::clr_name(clr_name);
        let mut properties = Vec::with_capacity(ct.properties.len());

        for p in &ct.properties {
            let property_clr_name = match options.property_type_clr_name(&identity, &p.alias)? {
                Some(name) => name,
                None => self.naming.property_name(&p.alias, &p.name),
            };
            let excluded = !self.property_filter.include(ct, p);
            let state = if excluded || options.is_property_ignored(&identity, &p.alias)? {
                PropertyState::Ignored
            } else if options.is_property_implemented(&identity, &p.alias)? {
                PropertyState::Implemented
            } else {
                PropertyState::Generate
            };
            if state != PropertyState::Ignored {
                validate_identifier(
                    &property_clr_name,
                    &format!("property '{}' of content type '{}'", p.alias, ct.alias),
                )?;
            }
            debug!(content_type = %ct.alias, property = %p.alias, ?state, "Property decision");

            properties.push(PropertyModel {
                alias: p.alias.clone(),
                clr_name: property_clr_name,
                name: p.name.clone(),
                description: p.description.clone(),
                editor_alias: p.editor_alias.clone(),
                variations: p.variations,
                value_type: resolve_value_type(
                    p.value_type.as_deref(),
                    value_type_names,
                    &self.options.content_base_interface,
                ),
                state,
            });
        }
        Ok(properties)
    }

    /// Properties of the mixin interfaces `index` introduces, i.e. those its
    /// parent chain does not already implement.
    fn mixin_properties(
        &self,
        index: usize,
        models: &[ContentTypeModel],
        options: &ContentTypesCodeOptions,
    ) -> AppResult<Vec<MixinPropertyRef>> {
        let covered = covered_types(index, models);
        let inherited = models[index]
            .parent
            .map(|p| covered_types(p, models))
            .unwrap_or_default();

        let identity = ContentTypeIdentity::clr_name(&models[index].clr_name);
        let mut refs = Vec::new();
        for mixin in covered.difference(&inherited).filter(|m| **m != index) {
            for (p, property) in models[*mixin].properties.iter().enumerate() {
                let state = if property.state == PropertyState::Ignored
                    || options.is_property_ignored(&identity, &property.alias)?
                {
                    PropertyState::Ignored
                } else if options.is_property_implemented(&identity, &property.alias)? {
                    PropertyState::Implemented
                } else {
                    PropertyState::Generate
                };
                refs.push(MixinPropertyRef {
                    mixin: *mixin,
                    property: p,
                    state,
                });
            }
        }
        Ok(refs)
    }

    fn resolve_inheritance(
        &self,
        index: usize,
        ct: &ContentTypeDef,
        models: &mut [ContentTypeModel],
        code_options: &CodeOptions,
    ) {
        let options = &code_options.content_types;
        let clr_name = models[index].clr_name.clone();
        let user_base_class = options.content_type_base_class(&clr_name).map(str::to_string);
        let parent_clr_name = models[index].parent.map(|p| models[p].clr_name.clone());

        let base_class = self.base_class_resolver.resolve(&BaseClassContext {
            content_type: ct,
            parent_clr_name: parent_clr_name.as_deref(),
            user_base_class: user_base_class.as_deref(),
            models_base_class: code_options.models_base_class.as_deref(),
            options: &self.options,
        });

        let declared: BTreeSet<&str> = options
            .content_type_interfaces(&clr_name)
            .iter()
            .map(|i| simple_name(i))
            .collect();
        let mut interfaces: Vec<String> = Vec::new();
        let own = models[index].is_mixin.then(|| models[index].interface_name());
        for name in models[index]
            .mixins
            .iter()
            .map(|m| models[*m].interface_name())
            .chain(own)
        {
            if !declared.contains(name.as_str()) && !interfaces.contains(&name) {
                interfaces.push(name);
            }
        }

        let mut interface_bases = Vec::new();
        if models[index].is_mixin {
            interface_bases.extend(models[index].parent.map(|p| models[p].interface_name()));
            for m in &models[index].mixins {
                let name = models[*m].interface_name();
                if !interface_bases.contains(&name) {
                    interface_bases.push(name);
                }
            }
            if interface_bases.is_empty() {
                interface_bases.push(self.base_interface(ct.kind).to_string());
            }
        }

        let model = &mut models[index];
        model.omit_constructor = options.omit_content_type_constructor(&clr_name);
        model.base_class = base_class;
        model.user_base_class = user_base_class;
        model.interfaces = interfaces;
        model.interface_bases = interface_bases;
    }
}

/// The type, its ancestors, and every mixin reachable from them.
fn covered_types(index: usize, models: &[ContentTypeModel]) -> BTreeSet<usize> {
    let mut covered = BTreeSet::new();
    let mut pending = vec![index];
    while let Some(current) = pending.pop() {
        if !covered.insert(current) {
            continue;
        }
        pending.extend(models[current].parent);
        pending.extend(models[current].mixins.iter().copied());
    }
    covered
}

fn simple_name(name: &str) -> &str {
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit('.').next().unwrap_or(name)
}

/// A member the writer emits on a generated type. Methods carry their
/// parameter list and may overload each other; any other member owns its name.
struct Member<'a> {
    name: String,
    parameters: Option<String>,
    /// Alias of the property the member is generated for, `None` for helpers.
    property: Option<&'a str>,
}

impl<'a> Member<'a> {
    fn helper(name: &str, parameters: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            parameters: parameters.map(str::to_string),
            property: None,
        }
    }

    /// The instance accessor of `p`: a property, or a getter method in
    /// [`PropertyStyle::Method`].
    fn accessor(p: &'a PropertyModel, options: &GenerationOptions) -> Self {
        if options.property_style.has_properties() {
            Self {
                name: p.clr_name.clone(),
                parameters: None,
                property: Some(p.alias.as_str()),
            }
        } else {
            Self::getter(p, options, "()")
        }
    }

    fn getter(p: &'a PropertyModel, options: &GenerationOptions, parameters: &str) -> Self {
        Self {
            name: options.getter_name(&p.clr_name),
            parameters: Some(parameters.to_string()),
            property: Some(p.alias.as_str()),
        }
    }

    fn clashes_with(&self, other: &Member<'_>) -> bool {
        self.name == other.name
            && (self.parameters.is_none()
                || other.parameters.is_none()
                || self.parameters == other.parameters)
    }
}

fn reserved_name(property: &str, content_type: &str, name: &str) -> AppError {
    AppError::Configuration(format!(
        "Property '{}' of content type '{}' has reserved CLR name '{}'",
        property, content_type, name
    ))
}

/// Members of one generated type must not clash with each other nor be named
/// after the type itself.
fn check_members(content_type: &str, enclosing: &str, members: &[Member<'_>]) -> AppResult<()> {
    for (i, member) in members.iter().enumerate() {
        let Some(alias) = member.property else {
            continue;
        };
        if member.name == enclosing {
            return Err(reserved_name(alias, content_type, &member.name));
        }
        if let Some(other) = members[..i].iter().find(|o| member.clashes_with(o)) {
            return Err(match other.property {
                Some(other_alias) => AppError::Configuration(format!(
                    "CLR name collision on content type '{}': members generated for properties '{}' and '{}' are both named '{}'",
                    content_type, other_alias, alias, member.name
                )),
                None => reserved_name(alias, content_type, &member.name),
            });
        }
    }
    Ok(())
}

/// Property CLR names of a class must be unique, and every member the writer
/// emits for them (accessors, getter methods, mixin static getters, extension
/// methods) must fit next to the generated helpers.
fn check_member_names<'a>(
    model: &'a ContentTypeModel,
    models: &'a [ContentTypeModel],
    options: &GenerationOptions,
) -> AppResult<()> {
    let own: Vec<&PropertyModel> = model
        .properties
        .iter()
        .filter(|p| p.state != PropertyState::Ignored)
        .collect();
    let mixed: Vec<&PropertyModel> = model
        .mixin_properties
        .iter()
        .filter(|r| r.state != PropertyState::Ignored)
        .map(|r| &models[r.mixin].properties[r.property])
        .collect();

    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for property in own.iter().chain(&mixed) {
        let name = property.clr_name.as_str();
        if let Some(other) = seen.insert(name, &property.alias) {
            return Err(AppError::Configuration(format!(
                "CLR name collision on content type '{}': properties '{}' and '{}' both map to '{}'",
                model.alias, other, property.alias, name
            )));
        }
    }

    let style = options.property_style;
    let members = style != PropertyStyle::ExtensionMethod;
    let mut class: Vec<Member<'_>> = HELPER_MEMBERS
        .iter()
        .map(|(name, parameters)| Member::helper(name, *parameters))
        .collect();
    if members {
        class.extend(mixed.iter().chain(&own).map(|p| Member::accessor(*p, options)));
        if model.is_mixin {
            let parameters = format!("({})", model.interface_name());
            class.extend(own.iter().map(|p| Member::getter(*p, options, &parameters)));
        }
    }
    check_members(&model.alias, &model.clr_name, &class)?;

    if model.is_mixin && members {
        let interface: Vec<Member<'_>> =
            own.iter().map(|p| Member::accessor(*p, options)).collect();
        check_members(&model.alias, &model.interface_name(), &interface)?;
    }

    if style.has_extension_methods() {
        let target = if model.is_mixin {
            model.interface_name()
        } else {
            model.clr_name.clone()
        };
        let parameters = format!("(this {})", target);
        let extensions: Vec<Member<'_>> = own
            .iter()
            .filter(|p| p.state == PropertyState::Generate)
            .map(|p| Member::getter(*p, options, &parameters))
            .collect();
        check_members(&model.alias, &model.extensions_name(), &extensions)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodeOptionsBuilder;
    use crate::schema::PropertyTypeDef;
    use pretty_assertions::assert_eq;

    fn prop(alias: &str) -> PropertyTypeDef {
        PropertyTypeDef {
            alias: alias.into(),
            editor_alias: "Umbraco.TextBox".into(),
            name: alias.into(),
            description: None,
            variations: Default::default(),
            value_type: Some("string".into()),
        }
    }

    fn ct(
        id: i64,
        alias: &str,
        parent: Option<i64>,
        compositions: &[i64],
        props: &[&str],
    ) -> ContentTypeDef {
        ContentTypeDef {
            id,
            alias: alias.into(),
            parent_id: parent,
            kind: ContentKind::Content,
            name: alias.into(),
            description: None,
            variations: Default::default(),
            properties: props.iter().map(|p| prop(p)).collect(),
            composition_type_ids: compositions.to_vec(),
        }
    }

    fn schema() -> Vec<ContentTypeDef> {
        vec![
            ct(1, "seoComposition", None, &[], &["metaDescription", "metaKeywords"]),
            ct(2, "page", None, &[1], &["title", "bodyText"]),
            ct(3, "newsPage", Some(2), &[1, 2], &["author"]),
        ]
    }

    fn build(types: &[ContentTypeDef], options: CodeOptions) -> AppResult<CodeModel> {
        CodeModelBuilder::new(GenerationOptions::default()).build(types, options)
    }

    #[test]
    fn test_names_mixins_and_bases() {
        let model = build(&schema(), CodeOptions::default()).unwrap();
        let names: Vec<_> = model.types.iter().map(|t| t.clr_name.as_str()).collect();
        assert_eq!(names, vec!["SeoComposition", "Page", "NewsPage"]);

        let seo = model.type_by_alias("seoComposition").unwrap();
        assert!(seo.is_mixin);
        assert_eq!(seo.interfaces, vec!["ISeoComposition"]);
        assert_eq!(
            seo.interface_bases,
            vec!["Umbraco.Core.Models.PublishedContent.IPublishedContent"]
        );

        let page = model.type_by_alias("page").unwrap();
        assert!(!page.is_mixin);
        assert_eq!(page.interfaces, vec!["ISeoComposition"]);
        assert_eq!(page.mixin_properties.len(), 2);
        assert_eq!(
            page.base_class.as_deref(),
            Some("Umbraco.Core.Models.PublishedContent.PublishedContentModel")
        );

        let news = model.type_by_alias("newsPage").unwrap();
        assert_eq!(news.base_class.as_deref(), Some("Page"));
        // Parent and the mixin it already brings are skipped.
        assert_eq!(news.mixins, vec![0]);
        assert!(news.mixin_properties.is_empty());
        assert_eq!(model.namespace, "Umbraco.Web.PublishedModels");
    }

    #[test]
    fn test_ignored_types_take_descendants() {
        let mut b = CodeOptionsBuilder::new();
        b.ignore_content_type("pa*");
        let model = build(&schema(), b.build()).unwrap();
        assert_eq!(model.types.len(), 1);
        // The mixin no longer has anyone composing it.
        assert!(!model.types[0].is_mixin);
    }

    #[test]
    fn test_property_decisions() {
        let mut b = CodeOptionsBuilder::new();
        b.ignore_property_type(&ContentTypeIdentity::alias("page"), "body*")
            .implement_property_type(&ContentTypeIdentity::alias("page"), "metaDescription")
            .implement_property_type(&ContentTypeIdentity::clr_name("Page"), "title")
            .set_property_type_clr_name(&ContentTypeIdentity::alias("page"), "title", "Heading");
        let model = build(&schema(), b.build()).unwrap();

        let page = model.type_by_alias("page").unwrap();
        let states: Vec<_> = page
            .properties
            .iter()
            .map(|p| (p.clr_name.as_str(), p.state))
            .collect();
        assert_eq!(
            states,
            vec![
                ("Heading", PropertyState::Implemented),
                ("BodyText", PropertyState::Ignored)
            ]
        );
        let mixin_states: Vec<_> = page.mixin_properties.iter().map(|r| r.state).collect();
        assert_eq!(mixin_states, vec![PropertyState::Implemented, PropertyState::Generate]);

        // The mixin itself still declares it.
        let seo = model.type_by_alias("seoComposition").unwrap();
        assert!(seo.properties.iter().all(|p| p.state == PropertyState::Generate));
    }

    #[test]
    fn test_user_base_class_and_interfaces() {
        let mut b = CodeOptionsBuilder::new();
        b.content_type_model_has_base_class("Page", "MyBase")
            .content_type_model_has_interface("Page", "Models.ISeoComposition")
            .content_type_model_has_constructor("Page");
        let model = build(&schema(), b.build()).unwrap();
        let page = model.type_by_alias("page").unwrap();
        assert_eq!(page.base_class, None);
        assert_eq!(page.user_base_class.as_deref(), Some("MyBase"));
        assert!(page.interfaces.is_empty());
        assert!(page.omit_constructor);
    }

    #[test]
    fn test_type_name_collisions() {
        let types = vec![ct(1, "my_page", None, &[], &[]), ct(2, "myPage", None, &[], &[])];
        let err = build(&types, CodeOptions::default()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("'myPage'"));
        assert!(err.to_string().contains("'my_page'"));

        let mut options = GenerationOptions::default();
        options.property_style = PropertyStyle::ExtensionMethod;
        let types = vec![ct(1, "page", None, &[], &[]), ct(2, "pageExtensions", None, &[], &[])];
        let err = CodeModelBuilder::new(options)
            .build(&types, CodeOptions::default())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_property_name_collisions() {
        let types = vec![ct(1, "page", None, &[], &["body_text", "bodyText"])];
        let err = build(&types, CodeOptions::default()).unwrap_err();
        assert!(err.to_string().contains("both map to 'BodyText'"));

        let types = vec![ct(1, "page", None, &[], &["page"])];
        assert!(build(&types, CodeOptions::default()).unwrap_err().is_configuration());

        let types = vec![ct(1, "page", None, &[], &["modelTypeAlias"])];
        assert!(build(&types, CodeOptions::default()).unwrap_err().is_configuration());

        // Ignoring one side resolves the collision.
        let mut b = CodeOptionsBuilder::new();
        b.ignore_property_type(&ContentTypeIdentity::alias("page"), "body_text");
        let types = vec![ct(1, "page", None, &[], &["body_text", "bodyText"])];
        assert!(build(&types, b.build()).is_ok());
    }

    #[test]
    fn test_getter_names_clash_with_members() {
        // `GetTitle` property next to the static getter `GetTitle(ISeo)`.
        let types = vec![ct(1, "seo", None, &[], &["title", "getTitle"]), ct(2, "page", None, &[1], &[])];
        let err = build(&types, CodeOptions::default()).unwrap_err();
        assert!(err.is_configuration());
        let message = err.to_string();
        assert!(message.contains("content type 'seo'"), "{}", message);
        assert!(message.contains("'title'") && message.contains("'getTitle'"), "{}", message);
        assert!(message.contains("both named 'GetTitle'"), "{}", message);

        let mut options = GenerationOptions::default();
        options.property_style = PropertyStyle::Method;
        let methods = CodeModelBuilder::new(options);
        // Instance `GetTitle()` and static `GetTitle(ISeo)` are overloads.
        assert!(methods.build(&types, CodeOptions::default()).is_ok());

        let types = vec![ct(1, "page", None, &[], &["modelContentType"])];
        let err = methods.build(&types, CodeOptions::default()).unwrap_err();
        assert!(
            err.to_string().contains("reserved CLR name 'GetModelContentType'"),
            "{}",
            err
        );
        assert!(build(&types, CodeOptions::default()).is_ok());
    }

    #[test]
    fn test_extension_methods_fit_their_class() {
        let mut options = GenerationOptions::default();
        options.property_style = PropertyStyle::ExtensionMethod;
        let builder = CodeModelBuilder::new(options);
        // No instance members, so a property named after a helper is fine.
        let types = vec![ct(1, "page", None, &[], &["modelTypeAlias"])];
        assert!(builder.build(&types, CodeOptions::default()).is_ok());

        let mut b = CodeOptionsBuilder::new();
        b.set_property_type_clr_name(&ContentTypeIdentity::alias("page"), "title", "Extensions");
        let types = vec![ct(1, "page", None, &[], &["title"])];
        let mut options = GenerationOptions::default();
        options.property_style = PropertyStyle::ExtensionMethod;
        options.getter_pattern = "Page{0}".into();
        let err = CodeModelBuilder::new(options).build(&types, b.build()).unwrap_err();
        assert!(err.to_string().contains("reserved CLR name 'PageExtensions'"), "{}", err);
    }

    #[test]
    fn test_ignored_property_skips_name_validation() {
        let page = ContentTypeIdentity::alias("page");
        let mut b = CodeOptionsBuilder::new();
        b.set_property_type_clr_name(&page, "title", "bad name")
            .ignore_property_type(&page, "title");
        let model = build(&schema(), b.build()).unwrap();
        let title = &model.type_by_alias("page").unwrap().properties[0];
        assert_eq!(title.state, PropertyState::Ignored);

        let mut b = CodeOptionsBuilder::new();
        b.set_property_type_clr_name(&page, "title", "bad name");
        let err = build(&schema(), b.build()).unwrap_err();
        assert!(err.to_string().contains("Invalid CLR name 'bad name'"), "{}", err);
    }

    #[test]
    fn test_broken_links() {
        let types = vec![ct(1, "page", Some(9), &[], &[])];
        assert!(build(&types, CodeOptions::default()).unwrap_err().is_configuration());

        let types = vec![ct(1, "page", None, &[7], &[])];
        assert!(build(&types, CodeOptions::default()).unwrap_err().is_configuration());

        let types = vec![ct(1, "a", Some(2), &[], &[]), ct(2, "b", Some(1), &[], &[])];
        let err = build(&types, CodeOptions::default()).unwrap_err();
        assert!(err.to_string().contains("inherits from itself"));
    }

    #[test]
    fn test_options_must_not_be_mapped_twice() {
        let mut options = CodeOptions::default();
        options
            .content_types
            .map_content_type_aliases_to_clr_names(&BTreeMap::new())
            .unwrap();
        assert!(build(&schema(), options).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_value_type_placeholders_and_namespace() {
        let mut types = schema();
        types[1].properties[0].value_type = Some("IEnumerable<{model:seoComposition}>".into());
        types[1].properties[1].value_type = None;

        let mut b = CodeOptionsBuilder::new();
        b.set_models_namespace("My.Models").use_namespace("My.Extra");
        let model = build(&types, b.build()).unwrap();
        let page = model.type_by_alias("page").unwrap();
        assert_eq!(page.properties[0].value_type, "IEnumerable<SeoComposition>");
        assert_eq!(page.properties[1].value_type, "object");
        assert_eq!(model.namespace, "My.Models");
        assert_eq!(model.using_namespaces, vec!["My.Extra"]);
    }

    fn custom_base(_: &BaseClassContext<'_>) -> Option<String> {
        Some("Custom".to_string())
    }

    #[test]
    fn test_custom_strategies() {
        let builder = CodeModelBuilder::new(GenerationOptions::default())
            .with_property_filter(|_: &ContentTypeDef, p: &PropertyTypeDef| p.alias != "title")
            .with_base_class_resolver(custom_base);
        let model = builder.build(&schema(), CodeOptions::default()).unwrap();
        let page = model.type_by_alias("page").unwrap();
        assert_eq!(page.properties[0].state, PropertyState::Ignored);
        assert_eq!(page.base_class.as_deref(), Some("Custom"));
    }
}
