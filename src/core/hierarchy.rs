/// Template hierarchy resolution: parent chains, attribute precedence and
/// inherited component membership.
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::schema::entity::AttributeValues;
use crate::schema::ids::TemplateId;
use crate::schema::template::{composite_key, AttributeDefinition, Template};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// Parent pointers loop back on themselves. `chain` lists the walk from
    /// the starting template up to and including the repeated id.
    #[error("template inheritance cycle at {template_id}: {}", display_chain(.chain))]
    Cycle {
        template_id: TemplateId,
        chain: Vec<TemplateId>,
    },
}

fn display_chain(chain: &[TemplateId]) -> String {
    chain
        .iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A base attribute together with the template that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttribute {
    pub definition: AttributeDefinition,
    pub defined_by: TemplateId,
}

/// An attribute contributed by an included component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentAttribute {
    /// `"{componentId}_{attributeId}"`.
    pub key: String,
    pub component_id: TemplateId,
    pub definition: AttributeDefinition,
}

/// The effective shape of a template once its ancestry is flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub template_id: TemplateId,
    /// One entry per attribute id, root-to-leaf order of first appearance.
    pub attributes: Vec<ResolvedAttribute>,
    /// Components included anywhere in the ancestry, de-duplicated.
    pub components: Vec<TemplateId>,
    pub component_attributes: Vec<ComponentAttribute>,
}

impl ResolvedTemplate {
    pub fn has_component(&self, component_id: &TemplateId) -> bool {
        self.components.contains(component_id)
    }

    /// Every attribute key an entity of this template may legally carry.
    pub fn attribute_keys(&self) -> Vec<String> {
        self.attributes
            .iter()
            .map(|a| a.definition.id.clone())
            .chain(self.component_attributes.iter().map(|c| c.key.clone()))
            .collect()
    }

    /// Attribute slots pre-filled from declared defaults. Slots without a
    /// default are present but null.
    pub fn default_values(&self) -> AttributeValues {
        let mut values = AttributeValues::new();
        for attr in &self.attributes {
            values.insert(
                attr.definition.id.clone(),
                attr.definition.default_value.clone(),
            );
        }
        for attr in &self.component_attributes {
            values.insert(attr.key.clone(), attr.definition.default_value.clone());
        }
        values
    }
}

fn find<'a>(templates: &'a [Template], id: &TemplateId) -> Option<&'a Template> {
    templates.iter().find(|t| &t.id == id)
}

/// The inheritance chain of `template_id`, leaf first.
///
/// Returns an empty chain when the template is unknown. A parent id that
/// names no template ends the chain there.
pub fn ancestry<'a>(
    template_id: &TemplateId,
    templates: &'a [Template],
) -> Result<Vec<&'a Template>, HierarchyError> {
    let mut chain = Vec::new();
    let mut visited = FxHashSet::default();
    let mut next = find(templates, template_id);

    while let Some(template) = next {
        if !visited.insert(&template.id) {
            let mut ids: Vec<TemplateId> = chain.iter().map(|t: &&Template| t.id.clone()).collect();
            ids.push(template.id.clone());
            return Err(HierarchyError::Cycle {
                template_id: template.id.clone(),
                chain: ids,
            });
        }
        chain.push(template);
        next = template
            .parent_id
            .as_ref()
            .and_then(|parent| find(templates, parent));
    }

    Ok(chain)
}

/// Flatten a chain (leaf first) into its base attributes.
fn base_attributes(chain: &[&Template]) -> Vec<ResolvedAttribute> {
    // Nearest template wins: first sighting walking leaf -> root.
    let mut nearest: Vec<ResolvedAttribute> = Vec::new();
    for template in chain {
        for def in &template.attributes {
            if !nearest.iter().any(|a| a.definition.id == def.id) {
                nearest.push(ResolvedAttribute {
                    definition: def.clone(),
                    defined_by: template.id.clone(),
                });
            }
        }
    }

    // Present them root -> leaf by where each id first appears.
    let mut ordered: Vec<ResolvedAttribute> = Vec::with_capacity(nearest.len());
    for template in chain.iter().rev() {
        for def in &template.attributes {
            if ordered.iter().any(|a| a.definition.id == def.id) {
                continue;
            }
            if let Some(winner) = nearest.iter().find(|a| a.definition.id == def.id) {
                ordered.push(winner.clone());
            }
        }
    }
    ordered
}

/// Components included anywhere in a chain (leaf first), root-to-leaf,
/// de-duplicated.
fn chain_components(chain: &[&Template]) -> Vec<TemplateId> {
    let mut seen = FxHashSet::default();
    let mut components = Vec::new();
    for template in chain.iter().rev() {
        for component in &template.included_component_ids {
            if seen.insert(component) {
                components.push(component.clone());
            }
        }
    }
    components
}

/// Resolve a template into its effective attribute table and component set.
///
/// `Ok(None)` means the template id is unknown; callers treat the entity
/// shape as unknown and fail soft. A cycle anywhere in the ancestry (or in
/// the ancestry of an included component) is an error.
pub fn resolve(
    template_id: &TemplateId,
    templates: &[Template],
) -> Result<Option<ResolvedTemplate>, HierarchyError> {
    let chain = ancestry(template_id, templates)?;
    if chain.is_empty() {
        return Ok(None);
    }

    let attributes = base_attributes(&chain);
    let components = chain_components(&chain);

    let mut component_attributes = Vec::new();
    for component_id in &components {
        // A component id with no template still counts for membership,
        // it just contributes no attributes.
        let component_chain = ancestry(component_id, templates)?;
        for attr in base_attributes(&component_chain) {
            component_attributes.push(ComponentAttribute {
                key: composite_key(component_id, &attr.definition.id),
                component_id: component_id.clone(),
                definition: attr.definition,
            });
        }
    }

    Ok(Some(ResolvedTemplate {
        template_id: template_id.clone(),
        attributes,
        components,
        component_attributes,
    }))
}

/// Inherited component membership of a template; empty for unknown ids.
pub fn component_ids(
    template_id: &TemplateId,
    templates: &[Template],
) -> Result<FxHashSet<TemplateId>, HierarchyError> {
    let chain = ancestry(template_id, templates)?;
    Ok(chain_components(&chain).into_iter().collect())
}

/// Every template whose ancestry contains a cycle, with the error found.
pub fn find_cycles(templates: &[Template]) -> Vec<HierarchyError> {
    templates
        .iter()
        .filter_map(|t| ancestry(&t.id, templates).err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::entity::AttributeValue;
    use crate::schema::template::AttributeKind;

    fn attr(id: &str, name: &str) -> AttributeDefinition {
        AttributeDefinition::new(id, name, AttributeKind::Text)
    }

    fn three_level() -> Vec<Template> {
        vec![
            Template::new("creature", "Creature")
                .with_attribute(attr("health", "Health (creature)"))
                .with_attribute(attr("age", "Age"))
                .including("mortal"),
            Template::new("person", "Person")
                .with_parent("creature")
                .with_attribute(attr("mood", "Mood")),
            Template::new("colonist", "Colonist")
                .with_parent("person")
                .with_attribute(attr("health", "Health (colonist)"))
                .with_attribute(attr("job", "Job")),
            Template::component("mortal", "Mortal")
                .with_attribute(attr("wounds", "Wounds").with_default(AttributeValue::Number(0.0))),
        ]
    }

    #[test]
    fn nearest_definition_wins() {
        let templates = three_level();
        let resolved = resolve(&TemplateId::new("colonist"), &templates)
            .unwrap()
            .unwrap();

        let health: Vec<_> = resolved
            .attributes
            .iter()
            .filter(|a| a.definition.id == "health")
            .collect();
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].definition.name, "Health (colonist)");
        assert_eq!(health[0].defined_by, TemplateId::new("colonist"));

        let ids: Vec<&str> = resolved
            .attributes
            .iter()
            .map(|a| a.definition.id.as_str())
            .collect();
        assert_eq!(ids, vec!["health", "age", "mood", "job"]);
    }

    #[test]
    fn components_inherit_down_the_chain() {
        let templates = three_level();
        let resolved = resolve(&TemplateId::new("colonist"), &templates)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.components, vec![TemplateId::new("mortal")]);
        assert!(resolved.has_component(&TemplateId::new("mortal")));
        assert_eq!(resolved.component_attributes[0].key, "mortal_wounds");

        let set = component_ids(&TemplateId::new("person"), &templates).unwrap();
        assert!(set.contains(&TemplateId::new("mortal")));
    }

    #[test]
    fn duplicate_component_includes_collapse() {
        let mut templates = three_level();
        templates[2].included_component_ids.push(TemplateId::new("mortal"));
        let resolved = resolve(&TemplateId::new("colonist"), &templates)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.components.len(), 1);
        assert_eq!(resolved.component_attributes.len(), 1);
    }

    #[test]
    fn attribute_keys_and_defaults() {
        let templates = three_level();
        let resolved = resolve(&TemplateId::new("colonist"), &templates)
            .unwrap()
            .unwrap();
        let keys = resolved.attribute_keys();
        assert_eq!(keys.len(), 5);
        assert!(keys.contains(&"mortal_wounds".to_string()));

        let defaults = resolved.default_values();
        assert_eq!(defaults["mortal_wounds"], Some(AttributeValue::Number(0.0)));
        assert_eq!(defaults["job"], None);
    }

    #[test]
    fn unknown_template_resolves_to_none() {
        let templates = three_level();
        assert!(resolve(&TemplateId::new("ghost"), &templates)
            .unwrap()
            .is_none());
        assert!(component_ids(&TemplateId::new("ghost"), &templates)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_parent_ends_chain() {
        let templates = vec![Template::new("orphan", "Orphan")
            .with_parent("nowhere")
            .with_attribute(attr("a", "A"))];
        let chain = ancestry(&TemplateId::new("orphan"), &templates).unwrap();
        assert_eq!(chain.len(), 1);
        let resolved = resolve(&TemplateId::new("orphan"), &templates)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.attributes.len(), 1);
    }

    #[test]
    fn cycle_is_reported() {
        let templates = vec![
            Template::new("a", "A").with_parent("b"),
            Template::new("b", "B").with_parent("c"),
            Template::new("c", "C").with_parent("a"),
        ];
        let err = resolve(&TemplateId::new("a"), &templates).unwrap_err();
        match &err {
            HierarchyError::Cycle { template_id, chain } => {
                assert_eq!(template_id, &TemplateId::new("a"));
                assert_eq!(chain.len(), 4);
            }
        }
        assert!(err.to_string().contains("a -> b -> c -> a"));
        assert_eq!(find_cycles(&templates).len(), 3);
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let templates = vec![Template::new("loop", "Loop").with_parent("loop")];
        assert!(component_ids(&TemplateId::new("loop"), &templates).is_err());
    }
}
