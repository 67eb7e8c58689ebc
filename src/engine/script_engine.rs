// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use rhai::{CallFnOptions, Dynamic, Engine, Scope, AST};
use serde_json::Value;

use crate::config::RhaiConfig;
use crate::errors::TransformError;
use crate::observability::messages::engine::ScriptOutput;
use crate::observability::messages::StructuredLog;

/// Name of the function every transformation script must define.
pub const ENTRY_FUNCTION: &str = "transforming";

const DISABLED_SYMBOLS: &[&str] = &["eval", "import", "export"];

/// A Rhai engine holding one evaluated transformation script.
///
/// The script must define `transforming(obj)` or `transforming(obj, params)`.
/// Construction compiles the script and runs its top level once with `params`
/// bound as a constant; every invocation then calls the entry function against a
/// copy of the resulting scope.
pub struct ScriptEngine {
    engine: Engine,
    ast: AST,
    scope: Scope<'static>,
    params: Dynamic,
    takes_params: bool,
}

impl std::fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("takes_params", &self.takes_params)
            .finish_non_exhaustive()
    }
}

impl ScriptEngine {
    pub fn build(
        script: &str,
        params: Option<&Value>,
        limits: &RhaiConfig,
    ) -> Result<Self, TransformError> {
        let engine = create_engine(limits);

        let ast = engine
            .compile(script)
            .map_err(|e| TransformError::ScriptEvaluation(format!("compilation failed: {e}")))?;

        let takes_params = match entry_arity(&ast) {
            Some(2) => true,
            Some(1) => false,
            _ => {
                return Err(TransformError::ScriptEvaluation(format!(
                    "script must define {ENTRY_FUNCTION}(obj) or {ENTRY_FUNCTION}(obj, params)"
                )))
            }
        };

        let params = match params {
            Some(value) => rhai::serde::to_dynamic(value).map_err(|e| {
                TransformError::ScriptEvaluation(format!("params cannot be bound: {e}"))
            })?,
            None => Dynamic::UNIT,
        };

        let mut scope = Scope::new();
        if !params.is_unit() {
            scope.push_constant("params", params.clone());
        }
        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| TransformError::ScriptEvaluation(e.to_string()))?;

        Ok(Self {
            engine,
            ast,
            scope,
            params,
            takes_params,
        })
    }

    /// Run the transformation on a JSON document, returning the result as JSON text.
    pub fn execute_transformation(&self, input: &str) -> Result<String, TransformError> {
        let input: Value = serde_json::from_str(input)
            .map_err(|e| TransformError::Invocation(format!("input is not JSON: {e}")))?;
        let input = rhai::serde::to_dynamic(&input)
            .map_err(|e| TransformError::Invocation(format!("input conversion failed: {e}")))?;

        let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
        let mut scope = self.scope.clone();
        let result = if self.takes_params {
            self.engine.call_fn_with_options::<Dynamic>(
                options,
                &mut scope,
                &self.ast,
                ENTRY_FUNCTION,
                (input, self.params.clone()),
            )
        } else {
            self.engine.call_fn_with_options::<Dynamic>(
                options,
                &mut scope,
                &self.ast,
                ENTRY_FUNCTION,
                (input,),
            )
        }
        .map_err(|e| TransformError::Invocation(e.to_string()))?;

        let output: Value = rhai::serde::from_dynamic(&result).map_err(|e| {
            TransformError::Invocation(format!("result is not structured data: {e}"))
        })?;
        serde_json::to_string(&output)
            .map_err(|e| TransformError::Invocation(format!("result serialization failed: {e}")))
    }
}

fn create_engine(limits: &RhaiConfig) -> Engine {
    let mut engine = Engine::new();

    engine.set_max_operations(limits.max_operations);
    engine.set_max_call_levels(limits.max_call_levels);
    engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
    engine.set_max_string_size(limits.max_string_size);
    engine.set_max_array_size(limits.max_array_size);
    engine.set_max_map_size(limits.max_map_size);

    for &symbol in DISABLED_SYMBOLS {
        engine.disable_symbol(symbol);
    }

    engine.on_print(|text| ScriptOutput { message: text }.log());
    engine.on_debug(|text, _source, _pos| ScriptOutput { message: text }.log());

    engine
}

/// Highest supported arity among the script's `transforming` overloads.
fn entry_arity(ast: &AST) -> Option<usize> {
    ast.iter_functions()
        .filter(|f| f.name == ENTRY_FUNCTION)
        .map(|f| f.params.len())
        .filter(|arity| *arity == 1 || *arity == 2)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(script: &str) -> Result<ScriptEngine, TransformError> {
        ScriptEngine::build(script, None, &RhaiConfig::default())
    }

    fn parse(output: &str) -> Value {
        serde_json::from_str(output).unwrap()
    }

    #[test]
    fn test_identity_round_trip() {
        let engine = build("fn transforming(obj) { obj }").unwrap();

        let output = engine.execute_transformation(r#"{"a":1}"#).unwrap();
        assert_eq!(parse(&output), json!({"a": 1}));
    }

    #[test]
    fn test_transformation_reshapes_document() {
        let script = r#"
            fn transforming(obj) {
                #{
                    "@type": "dcat:Dataset",
                    "title": obj.name,
                    "keywords": obj.tags.map(|t| t.to_upper())
                }
            }
        "#;
        let engine = build(script).unwrap();

        let output = engine
            .execute_transformation(r#"{"name":"Trees","tags":["park","city"]}"#)
            .unwrap();
        assert_eq!(
            parse(&output),
            json!({"@type": "dcat:Dataset", "title": "Trees", "keywords": ["PARK", "CITY"]})
        );
    }

    #[test]
    fn test_params_passed_to_two_argument_entry() {
        let params = json!({"catalogue": "demo"});
        let engine = ScriptEngine::build(
            "fn transforming(obj, params) { obj.catalogue = params.catalogue; obj }",
            Some(&params),
            &RhaiConfig::default(),
        )
        .unwrap();

        let output = engine.execute_transformation(r#"{"id":7}"#).unwrap();
        assert_eq!(parse(&output), json!({"id": 7, "catalogue": "demo"}));
    }

    #[test]
    fn test_params_bound_for_top_level_statements() {
        let params = json!({"required": true});
        let script = r#"
            if !params.required { throw "params not visible"; }
            fn transforming(obj) { obj }
        "#;

        assert!(ScriptEngine::build(script, Some(&params), &RhaiConfig::default()).is_ok());
        assert!(matches!(
            ScriptEngine::build(script, None, &RhaiConfig::default()),
            Err(TransformError::ScriptEvaluation(_))
        ));
    }

    #[test]
    fn test_engine_is_reusable() {
        let engine = build("fn transforming(obj) { obj.n += 1; obj }").unwrap();

        for _ in 0..3 {
            let output = engine.execute_transformation(r#"{"n":1}"#).unwrap();
            assert_eq!(parse(&output), json!({"n": 2}));
        }
    }

    #[test]
    fn test_missing_entry_function() {
        let result = build("fn transform(obj) { obj }");
        assert!(matches!(result, Err(TransformError::ScriptEvaluation(msg)) if msg.contains("transforming")));

        let result = build("fn transforming(a, b, c) { a }");
        assert!(matches!(result, Err(TransformError::ScriptEvaluation(_))));
    }

    #[test]
    fn test_syntax_error_is_evaluation_failure() {
        let result = build("fn transforming(obj) { obj ");
        assert!(matches!(result, Err(TransformError::ScriptEvaluation(_))));
    }

    #[test]
    fn test_top_level_error_is_evaluation_failure() {
        let result = build("throw \"broken\"; fn transforming(obj) { obj }");
        assert!(matches!(result, Err(TransformError::ScriptEvaluation(msg)) if msg.contains("broken")));
    }

    #[test]
    fn test_runtime_error_is_invocation_failure() {
        let engine = build("fn transforming(obj) { throw \"bad record\" }").unwrap();

        let result = engine.execute_transformation("{}");
        assert!(matches!(result, Err(TransformError::Invocation(msg)) if msg.contains("bad record")));
    }

    #[test]
    fn test_non_json_input_is_invocation_failure() {
        let engine = build("fn transforming(obj) { obj }").unwrap();
        assert!(matches!(
            engine.execute_transformation("{not json"),
            Err(TransformError::Invocation(_))
        ));
    }

    #[test]
    fn test_runaway_script_hits_operation_limit() {
        let limits = RhaiConfig {
            max_operations: 10_000,
            ..RhaiConfig::default()
        };
        let engine =
            ScriptEngine::build("fn transforming(obj) { loop { obj.x = 1; } }", None, &limits)
                .unwrap();

        assert!(matches!(
            engine.execute_transformation("{}"),
            Err(TransformError::Invocation(_))
        ));
    }
}
