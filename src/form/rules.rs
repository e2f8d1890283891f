// Validation rule aggregation over a field registry

use indexmap::IndexMap;
use serde_json::Value;

use super::registry::FieldRegistry;

/// Rule map keyed by qualified field name. Values are handed to the
/// validator untouched.
pub type RuleMap = IndexMap<String, Value>;

/// Friendly attribute names keyed by qualified field name
pub type AttributeMap = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedRules {
    pub rules: RuleMap,
    pub attributes: AttributeMap,
}

/// Collect the rules and labels declared by every field.
///
/// Fields without a `rules` option contribute nothing, label included.
pub fn aggregate(registry: &FieldRegistry) -> AggregatedRules {
    let mut aggregated = AggregatedRules::default();

    for field in registry.iter() {
        let Some(rules) = field.rules() else {
            continue;
        };

        aggregated
            .rules
            .insert(field.qualified_name().to_string(), rules.clone());
        aggregated
            .attributes
            .insert(field.qualified_name().to_string(), field.label());
    }

    aggregated
}

/// Merge caller overrides over field-declared rules; overrides win
pub fn merge_overrides(mut rules: RuleMap, overrides: &RuleMap) -> RuleMap {
    for (name, rule) in overrides {
        rules.insert(name.clone(), rule.clone());
    }
    rules
}

/// Build a rule map from a `json!({...})` literal
pub fn rule_map(value: Value) -> RuleMap {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => RuleMap::new(),
    }
}
