use crate::error::RenderError;
use crate::stage::{RenderedStage, TypedStage};
use docpipe_core::{AnySerializer, SerializerRegistry};
use serde_json::json;
use std::marker::PhantomData;

/// `{"$limit": n}`; passes documents through unchanged.
pub struct LimitStage<T> {
    limit: u64,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> LimitStage<T> {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            _marker: PhantomData,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl<T: 'static> TypedStage for LimitStage<T> {
    type Input = T;
    type Output = T;

    fn operator(&self) -> &str {
        "$limit"
    }

    fn render_stage(
        &self,
        input_serializer: &AnySerializer,
        _registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError> {
        Ok(RenderedStage::operator(
            "$limit",
            json!(self.limit),
            input_serializer.clone(),
        ))
    }
}

/// `{"$skip": n}`; passes documents through unchanged.
pub struct SkipStage<T> {
    skip: u64,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> SkipStage<T> {
    pub fn new(skip: u64) -> Self {
        Self {
            skip,
            _marker: PhantomData,
        }
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }
}

impl<T: 'static> TypedStage for SkipStage<T> {
    type Input = T;
    type Output = T;

    fn operator(&self) -> &str {
        "$skip"
    }

    fn render_stage(
        &self,
        input_serializer: &AnySerializer,
        _registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError> {
        Ok(RenderedStage::operator(
            "$skip",
            json!(self.skip),
            input_serializer.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use docpipe_core::{SerdeSerializer, TypeRegistry};
    use serde_json::Value;
    use test_case::test_case;

    #[test_case(0 ; "zero")]
    #[test_case(25 ; "some")]
    #[test_case(u64::MAX ; "max")]
    fn test_limit(limit: u64) {
        let input = AnySerializer::new(SerdeSerializer::<String>::new());
        let rendered = LimitStage::<String>::new(limit)
            .render(&input, &TypeRegistry::new())
            .unwrap();

        assert_eq!(Value::Object(rendered.document), json!({ "$limit": limit }));
        assert!(rendered.output_serializer.ptr_eq(&input));
    }

    #[test]
    fn test_skip() {
        let input = AnySerializer::new(SerdeSerializer::<String>::new());
        let stage = SkipStage::<String>::new(40);
        let rendered = stage.render(&input, &TypeRegistry::new()).unwrap();

        assert_eq!(stage.name(), "$skip");
        assert_eq!(Value::Object(rendered.document), json!({ "$skip": 40 }));
        assert!(rendered.output_serializer.ptr_eq(&input));
    }
}
