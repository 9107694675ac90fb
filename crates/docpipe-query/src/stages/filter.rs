use crate::error::RenderError;
use crate::field::TypedFieldName;
use crate::stage::{RenderedStage, TypedStage};
use docpipe_core::{AnySerializer, Document, SerializerRegistry};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Comparison operators supported by [`MatchStage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn operator(&self) -> &'static str {
        match self {
            Comparison::Eq => "$eq",
            Comparison::Ne => "$ne",
            Comparison::Gt => "$gt",
            Comparison::Gte => "$gte",
            Comparison::Lt => "$lt",
            Comparison::Lte => "$lte",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operator())
    }
}

type ConditionFn =
    dyn Fn(&AnySerializer, &dyn SerializerRegistry) -> Result<(String, Value), RenderError>
        + Send
        + Sync;

struct Condition {
    comparison: Comparison,
    resolve: Box<ConditionFn>,
}

/// `{"$match": {...}}` over documents of type `T`.
///
/// Each condition names a typed field and a value. The field is resolved
/// against the input serializer and the value is encoded with the field's
/// serializer, so custom encodings (e.g. an integer stored as a string) are
/// respected in the filter.
pub struct MatchStage<T> {
    conditions: Vec<Condition>,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T: 'static> MatchStage<T> {
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Add `field <comparison> value`.
    pub fn compare<F>(
        mut self,
        field: impl Into<TypedFieldName<T, F>>,
        comparison: Comparison,
        value: F,
    ) -> Self
    where
        F: Send + Sync + 'static,
    {
        let field = field.into();
        self.conditions.push(Condition {
            comparison,
            resolve: Box::new(move |input_serializer, registry| {
                let rendered = field.render(input_serializer, registry)?;
                let encoded = rendered.field_serializer().serialize(&value)?;
                Ok((rendered.field_name().to_string(), encoded))
            }),
        });
        self
    }

    pub fn eq<F: Send + Sync + 'static>(
        self,
        field: impl Into<TypedFieldName<T, F>>,
        value: F,
    ) -> Self {
        self.compare(field, Comparison::Eq, value)
    }

    pub fn ne<F: Send + Sync + 'static>(
        self,
        field: impl Into<TypedFieldName<T, F>>,
        value: F,
    ) -> Self {
        self.compare(field, Comparison::Ne, value)
    }

    pub fn gt<F: Send + Sync + 'static>(
        self,
        field: impl Into<TypedFieldName<T, F>>,
        value: F,
    ) -> Self {
        self.compare(field, Comparison::Gt, value)
    }

    pub fn gte<F: Send + Sync + 'static>(
        self,
        field: impl Into<TypedFieldName<T, F>>,
        value: F,
    ) -> Self {
        self.compare(field, Comparison::Gte, value)
    }

    pub fn lt<F: Send + Sync + 'static>(
        self,
        field: impl Into<TypedFieldName<T, F>>,
        value: F,
    ) -> Self {
        self.compare(field, Comparison::Lt, value)
    }

    pub fn lte<F: Send + Sync + 'static>(
        self,
        field: impl Into<TypedFieldName<T, F>>,
        value: F,
    ) -> Self {
        self.compare(field, Comparison::Lte, value)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl<T: 'static> Default for MatchStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `value` would read as an operator document if used as a shorthand
/// equality value.
fn is_operator_like(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.keys().any(|k| k.starts_with('$')))
}

fn operator_document(comparison: Comparison, value: Value) -> Value {
    let mut operators = Document::new();
    operators.insert(comparison.operator().to_string(), value);
    Value::Object(operators)
}

/// Build the filter document, keeping every condition.
///
/// A lone equality uses the `{field: value}` shorthand. Several conditions on
/// one field share an operator document. When an operator repeats on a field,
/// each of that field's conditions becomes a clause of a top-level `$and`.
fn build_filter(conditions: Vec<(String, Comparison, Value)>) -> Document {
    let mut fields: Vec<(String, Vec<(Comparison, Value)>)> = Vec::new();
    for (field, comparison, value) in conditions {
        match fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => existing.push((comparison, value)),
            None => fields.push((field, vec![(comparison, value)])),
        }
    }

    let mut filter = Document::new();
    let mut clauses = Vec::new();
    for (field, conditions) in fields {
        if let [(Comparison::Eq, value)] = conditions.as_slice() {
            if !is_operator_like(value) {
                filter.insert(field, value.clone());
                continue;
            }
        }

        let repeated = conditions
            .iter()
            .enumerate()
            .any(|(i, (comparison, _))| conditions[..i].iter().any(|(c, _)| c == comparison));
        if repeated {
            for (comparison, value) in conditions {
                let mut clause = Document::new();
                clause.insert(field.clone(), operator_document(comparison, value));
                clauses.push(Value::Object(clause));
            }
            continue;
        }

        let mut operators = Document::new();
        for (comparison, value) in conditions {
            operators.insert(comparison.operator().to_string(), value);
        }
        filter.insert(field, Value::Object(operators));
    }

    if !clauses.is_empty() {
        filter.insert("$and".to_string(), Value::Array(clauses));
    }
    filter
}

impl<T: 'static> TypedStage for MatchStage<T> {
    type Input = T;
    type Output = T;

    fn operator(&self) -> &str {
        "$match"
    }

    fn render_stage(
        &self,
        input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError> {
        let mut resolved = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            let (field, value) = (condition.resolve)(input_serializer, registry)?;
            resolved.push((field, condition.comparison, value));
        }

        Ok(RenderedStage::operator(
            "$match",
            Value::Object(build_filter(resolved)),
            input_serializer.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Selector;
    use crate::stage::Stage;
    use docpipe_core::{
        DocumentSerializer, SerdeSerializer, SerializationResult, Serializer, TypeRegistry,
    };
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use test_case::test_case;

    #[derive(Serialize, Deserialize)]
    struct Person {
        name: String,
        age: i64,
    }

    /// Stores `i64` as a decimal string.
    struct StringifiedInt;

    impl Serializer<i64> for StringifiedInt {
        fn serialize(&self, value: &i64) -> SerializationResult<Value> {
            Ok(Value::String(value.to_string()))
        }

        fn deserialize(&self, value: &Value) -> SerializationResult<i64> {
            let text = value.as_str().unwrap_or_default();
            text.parse()
                .map_err(|e| <serde_json::Error as serde::de::Error>::custom(e).into())
        }
    }

    fn people() -> AnySerializer {
        AnySerializer::new(
            DocumentSerializer::<Person>::builder()
                .map_member("Name", "name", SerdeSerializer::<String>::new())
                .map_member("Age", "age", StringifiedInt)
                .build(),
        )
    }

    fn name() -> Selector<Person, String> {
        Selector::new(|d| d.member::<String>("Name"))
    }

    fn age() -> Selector<Person, i64> {
        Selector::new(|d| d.member::<i64>("Age"))
    }

    fn render(stage: MatchStage<Person>) -> Result<Value, RenderError> {
        let rendered = stage.render(&people(), &TypeRegistry::with_defaults())?;
        Ok(Value::Object(rendered.document))
    }

    #[test]
    fn test_equality_uses_field_serializer() {
        let stage = MatchStage::<Person>::new()
            .eq(name(), "Ada".to_string())
            .eq(age(), 36);

        assert_eq!(
            render(stage).unwrap(),
            json!({ "$match": { "name": "Ada", "age": "36" } })
        );
    }

    #[test_case(Comparison::Ne, "$ne" ; "not equal")]
    #[test_case(Comparison::Gt, "$gt" ; "greater")]
    #[test_case(Comparison::Gte, "$gte" ; "greater or equal")]
    #[test_case(Comparison::Lt, "$lt" ; "less")]
    #[test_case(Comparison::Lte, "$lte" ; "less or equal")]
    fn test_operator_comparisons(comparison: Comparison, operator: &str) {
        let stage = MatchStage::<Person>::new().compare(age(), comparison, 18);

        assert_eq!(
            render(stage).unwrap(),
            json!({ "$match": { "age": { operator: "18" } } })
        );
    }

    #[test]
    fn test_range_on_one_field_is_merged() {
        let stage = MatchStage::<Person>::new().gte(age(), 18).lt(age(), 65);

        assert_eq!(
            render(stage).unwrap(),
            json!({ "$match": { "age": { "$gte": "18", "$lt": "65" } } })
        );
    }

    #[test]
    fn test_equality_then_comparison_keeps_both() {
        let stage = MatchStage::<Person>::new().eq(age(), 20).gt(age(), 10);

        assert_eq!(
            render(stage).unwrap(),
            json!({ "$match": { "age": { "$eq": "20", "$gt": "10" } } })
        );
    }

    #[test]
    fn test_comparison_then_equality_keeps_both() {
        let stage = MatchStage::<Person>::new().gt(age(), 10).eq(age(), 20);

        assert_eq!(
            render(stage).unwrap(),
            json!({ "$match": { "age": { "$gt": "10", "$eq": "20" } } })
        );
    }

    #[test]
    fn test_repeated_operator_becomes_conjunction() {
        let stage = MatchStage::<Person>::new()
            .eq(name(), "Ada".to_string())
            .gt(age(), 10)
            .gt(age(), 30);

        assert_eq!(
            render(stage).unwrap(),
            json!({ "$match": {
                "name": "Ada",
                "$and": [
                    { "age": { "$gt": "10" } },
                    { "age": { "$gt": "30" } },
                ],
            } })
        );
    }

    #[test]
    fn test_repeated_equality_becomes_conjunction() {
        let stage = MatchStage::<Person>::new().eq(age(), 1).eq(age(), 2);

        assert_eq!(
            render(stage).unwrap(),
            json!({ "$match": { "$and": [
                { "age": { "$eq": "1" } },
                { "age": { "$eq": "2" } },
            ] } })
        );
    }

    #[test_case(json!({}), json!({ "meta": {} }) ; "empty object stays shorthand")]
    #[test_case(json!({ "$gt": 1 }), json!({ "meta": { "$eq": { "$gt": 1 } } }) ; "operator keys are wrapped")]
    fn test_object_equality_values(value: Value, expected: Value) {
        let stage =
            MatchStage::<Person>::new().eq(TypedFieldName::<Person, Value>::literal("meta"), value);

        assert_eq!(render(stage).unwrap(), json!({ "$match": expected }));
    }

    #[test]
    fn test_object_equality_is_not_merged_into() {
        let meta = || TypedFieldName::<Person, Value>::literal("meta");
        let stage = MatchStage::<Person>::new()
            .eq(meta(), json!({}))
            .ne(meta(), json!(null));

        assert_eq!(
            render(stage).unwrap(),
            json!({ "$match": { "meta": { "$eq": {}, "$ne": null } } })
        );
    }

    #[test]
    fn test_literal_field_uses_registry_serializer() {
        let stage =
            MatchStage::<Person>::new().eq(TypedFieldName::<Person, i64>::literal("age"), 36);

        assert_eq!(
            render(stage).unwrap(),
            json!({ "$match": { "age": 36 } })
        );
    }

    #[test]
    fn test_empty_matches_everything() {
        assert_eq!(
            render(MatchStage::<Person>::new()).unwrap(),
            json!({ "$match": {} })
        );
    }

    #[test]
    fn test_unregistered_literal_type() {
        struct Opaque;
        let stage = MatchStage::<Person>::new()
            .eq(TypedFieldName::<Person, Opaque>::literal("blob"), Opaque);

        let err = render(stage).unwrap_err();
        assert!(matches!(err, RenderError::Resolution(_)));
    }
}
