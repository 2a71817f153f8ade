//! End-to-end tests for the resolver, driven through the public generator.

use super::*;
use crate::constants::MESSAGE_CHANNEL_CAPACITY;
use crate::definition::RawDefinition;
use crate::generator::GeneratorOptions;
use crate::picker::{AscendingOrderTemplatePicker, NoDuplicateTemplatePicker};
use crate::test_utils::{generator_with, init_test_logging, state_of};
use std::collections::{HashMap, HashSet};

fn ordered_templates() -> TemplatePipeline {
    TemplatePipeline::new(vec![
        Arc::new(NoDuplicateTemplatePicker),
        Arc::new(AscendingOrderTemplatePicker),
    ])
}

async fn generate_one(
    options: GeneratorOptions,
    definitions: Vec<RawDefinition>,
    initial: HashMap<String, String>,
) -> Result<String> {
    let generator = generator_with(options, definitions);
    let mut messages = generator.generate("Test", initial, 1).await?;
    assert_eq!(messages.len(), 1);
    Ok(messages.remove(0))
}

#[tokio::test]
async fn test_template_without_placeholders() {
    init_test_logging(None);
    let message = generate_one(
        GeneratorOptions::default().with_seed(1),
        vec![RawDefinition::new("Test", ["aaa"])],
        HashMap::new(),
    )
    .await
    .unwrap();
    assert_eq!(message, "aaa");
}

#[tokio::test]
async fn test_one_placeholder_skips_unsatisfied_candidate() {
    let message = generate_one(
        GeneratorOptions::default().with_seed(1),
        vec![
            RawDefinition::new("Test", ["aaa{{.NestTest}}ccc"]),
            RawDefinition::new("NestTest", ["bbb"]),
            RawDefinition::new("NestTest", ["xxx"]).with_constraint("k999", "v999"),
        ],
        HashMap::new(),
    )
    .await
    .unwrap();
    assert_eq!(message, "aaabbbccc");
}

#[tokio::test]
async fn test_later_placeholder_constrained_on_earlier_one() {
    let message = generate_one(
        GeneratorOptions::default().with_seed(2),
        vec![
            RawDefinition::new("Test", ["aaa{{.NestTest}}{{.NestTest2}}"]),
            RawDefinition::new("NestTest", ["bbb"]),
            RawDefinition::new("NestTest2", ["xxx"]).with_constraint("NestTest", "xxx"),
            RawDefinition::new("NestTest2", ["ccc"]).with_constraint("NestTest", "bbb"),
        ],
        HashMap::new(),
    )
    .await
    .unwrap();
    assert_eq!(message, "aaabbbccc");
}

#[tokio::test]
async fn test_unresolvable_placeholder() {
    let result = generate_one(
        GeneratorOptions::default().with_seed(3),
        vec![
            RawDefinition::new("Test", ["aaa{{.NestTest}}ccc"]),
            RawDefinition::new("NestTest", ["xxx"]).with_constraint("k999", "v999"),
        ],
        HashMap::new(),
    )
    .await;
    assert!(matches!(
        result,
        Err(PhrasegenError::NoValidMessage { ref def_type }) if def_type == "Test"
    ));
}

#[tokio::test]
async fn test_dead_nested_branch_falls_back_to_sibling() {
    for seed in 0..8 {
        let message = generate_one(
            GeneratorOptions::default().with_seed(seed),
            vec![
                RawDefinition::new("Test", ["aaa{{.NestTest}}ccc"]),
                RawDefinition::new("NestTest", ["{{.NestTest2}}"]),
                RawDefinition::new("NestTest", ["bbb"]),
                RawDefinition::new("NestTest2", ["{{.NoExistDef}}"]),
            ],
            HashMap::new(),
        )
        .await
        .unwrap();
        assert_eq!(message, "aaabbbccc", "seed {seed}");
    }
}

#[tokio::test]
async fn test_absence_constraint() {
    let message = generate_one(
        GeneratorOptions::default().with_seed(4),
        vec![
            RawDefinition::new("Test", ["aaa{{.NestTest}}ccc"]),
            RawDefinition::new("NestTest", ["xxx"]).with_constraint("k1!", "_"),
            RawDefinition::new("NestTest", ["ddd"]),
        ],
        state_of(&[("k1", "v1")]),
    )
    .await
    .unwrap();
    assert_eq!(message, "aaadddccc");
}

#[tokio::test]
async fn test_optional_constraint() {
    let message = generate_one(
        GeneratorOptions::default().with_seed(5),
        vec![
            RawDefinition::new("Test", ["aaa{{.NestTest}}ccc"]),
            RawDefinition::new("NestTest", ["xxx"])
                .with_constraint("K1?", "V2")
                .with_constraint("K2", "V2"),
            RawDefinition::new("NestTest", ["bbb"])
                .with_constraint("K1?", "V1")
                .with_constraint("K2", "V2")
                .with_constraint("K3?", "V3"),
        ],
        state_of(&[("K1", "V1"), ("K2", "V2")]),
    )
    .await
    .unwrap();
    assert_eq!(message, "aaabbbccc");
}

#[tokio::test]
async fn test_injecting_constraint_feeds_later_placeholder() {
    let message = generate_one(
        GeneratorOptions::default().with_seed(6),
        vec![
            RawDefinition::new("Test", ["aaa{{.NestTest}}{{.NestTest2}}"]),
            RawDefinition::new("NestTest", ["bbb"]).with_constraint("K1+", "V1"),
            RawDefinition::new("NestTest2", ["xxx"]).with_constraint("K1!", "_"),
            RawDefinition::new("NestTest2", ["ccc"]).with_constraint("K1", "V1"),
        ],
        HashMap::new(),
    )
    .await
    .unwrap();
    assert_eq!(message, "aaabbbccc");
}

#[tokio::test]
async fn test_regex_constraint() {
    let message = generate_one(
        GeneratorOptions::default().with_seed(7),
        vec![
            RawDefinition::new("Test", ["aaa{{.NestTest}}ccc"]),
            RawDefinition::new("NestTest", ["bbb"]).with_constraint("K1/", ".?1"),
            RawDefinition::new("NestTest", ["xxx"]).with_constraint("K1/", ".?2"),
        ],
        state_of(&[("K1", "V1")]),
    )
    .await
    .unwrap();
    assert_eq!(message, "aaabbbccc");
}

#[tokio::test]
async fn test_max_length_validator_prunes_long_branches() {
    for seed in 0..8 {
        let message = generate_one(
            GeneratorOptions::default().with_seed(seed).with_max_length(2),
            vec![
                RawDefinition::new("Test", ["xxx"]),
                RawDefinition::new("Test", ["{{.NestTest}}"]),
                RawDefinition::new("NestTest", ["yyy"]),
                RawDefinition::new("NestTest", ["aa"]),
            ],
            HashMap::new(),
        )
        .await
        .unwrap();
        assert_eq!(message, "aa", "seed {seed}");
    }
}

#[tokio::test]
async fn test_aliases_never_repeat_a_template() {
    let generator = generator_with(
        GeneratorOptions::default().with_seed(8),
        vec![
            RawDefinition::new("Test", ["{{.First}}{{.Second}}{{.Third}}"])
                .with_alias("First", "Part", false)
                .with_alias("Second", "Part", false)
                .with_alias("Third", "Part", false),
            RawDefinition::new("Part", ["aaa", "bbb", "ccc"]),
        ],
    );

    let messages = generator.generate("Test", HashMap::new(), 10).await.unwrap();
    assert_eq!(messages.len(), 6);
    for message in &messages {
        assert_eq!(message.len(), 9);
        for part in ["aaa", "bbb", "ccc"] {
            assert_eq!(message.matches(part).count(), 1, "{message}");
        }
    }
}

#[tokio::test]
async fn test_alias_allowing_duplicates() {
    let generator = generator_with(
        GeneratorOptions::default().with_seed(9).with_template_pipeline(ordered_templates()),
        vec![
            RawDefinition::new("Test", ["{{.First}}-{{.Second}}"])
                .with_alias("First", "Part", true)
                .with_alias("Second", "Part", true),
            RawDefinition::new("Part", ["a", "b"]),
        ],
    );

    let messages = generator.generate("Test", HashMap::new(), 10).await.unwrap();
    let messages: HashSet<_> = messages.into_iter().collect();
    let expected: HashSet<_> =
        ["a-a", "a-b", "b-a", "b-b"].into_iter().map(str::to_string).collect();
    assert_eq!(messages, expected);
}

#[tokio::test]
async fn test_pronouns_agree_with_injected_gender() {
    let generator = generator_with(
        GeneratorOptions::default().with_seed(10),
        vec![
            RawDefinition::new("Test", ["{{.Pronoun}} is {{.FirstName}}"])
                .with_order_by(["FirstName"]),
            RawDefinition::new("FirstName", ["Alice"]).with_constraint("Gender+", "Female"),
            RawDefinition::new("FirstName", ["Bob"]).with_constraint("Gender+", "Male"),
            RawDefinition::new("Pronoun", ["she"]).with_constraint("Gender", "Female"),
            RawDefinition::new("Pronoun", ["he"]).with_constraint("Gender", "Male"),
        ],
    );

    let messages: HashSet<_> =
        generator.generate("Test", HashMap::new(), 10).await.unwrap().into_iter().collect();
    let expected: HashSet<_> =
        ["she is Alice", "he is Bob"].into_iter().map(str::to_string).collect();
    assert_eq!(messages, expected);
}

#[tokio::test]
async fn test_resolution_state_carries_bindings() {
    let generator = generator_with(
        GeneratorOptions::default().with_seed(11),
        vec![
            RawDefinition::new("Test", ["{{.Name}}!"]),
            RawDefinition::new("Name", ["Alice"]).with_constraint("Gender+", "Female"),
        ],
    );

    let mut stream = generator.start("Test", State::new()).unwrap();
    let resolution = stream.next().await.unwrap().unwrap();
    assert_eq!(resolution.message, "Alice!");
    assert_eq!(resolution.state.get("Test"), Some("Alice!"));
    assert_eq!(resolution.state.get("Name"), Some("Alice"));
    assert_eq!(resolution.state.get("Gender"), Some("Female"));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_zero_count_is_rejected() {
    let generator =
        generator_with(GeneratorOptions::default(), vec![RawDefinition::new("Test", ["a"])]);
    let result = generator.generate("Test", HashMap::new(), 0).await;
    assert!(matches!(result, Err(PhrasegenError::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_unknown_root_suggests_close_types() {
    let generator =
        generator_with(GeneratorOptions::default(), vec![RawDefinition::new("Greeting", ["hi"])]);
    let result = generator.generate("Greting", HashMap::new(), 1).await;
    match result {
        Err(PhrasegenError::DefinitionNotFound {
            def_type,
            suggestions,
        }) => {
            assert_eq!(def_type, "Greting");
            assert_eq!(suggestions, ["Greeting"]);
        }
        other => panic!("Expected DefinitionNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_same_seed_same_messages() {
    let definitions = || {
        vec![
            RawDefinition::new("Test", ["{{.Adjective}} {{.Noun}}"]),
            RawDefinition::new("Adjective", ["red", "green", "blue", "tiny"]),
            RawDefinition::new("Noun", ["fox", "owl"]).with_weight(2.0),
            RawDefinition::new("Noun", ["cat", "dog"]),
        ]
    };

    let first = generator_with(GeneratorOptions::default().with_seed(42), definitions());
    let second = generator_with(GeneratorOptions::default().with_seed(42), definitions());
    let a = first.generate("Test", HashMap::new(), 5).await.unwrap();
    let b = second.generate("Test", HashMap::new(), 5).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 5);
}

#[tokio::test]
async fn test_depth_limit_bounds_self_reference() {
    let generator = generator_with(
        GeneratorOptions::default().with_seed(12).with_max_depth(4),
        vec![RawDefinition::new("Test", ["{{.Test}}", "end"])],
    );

    let messages = generator.generate("Test", HashMap::new(), 5).await.unwrap();
    assert_eq!(messages, ["end"]);
}

#[tokio::test]
async fn test_exhausted_search_returns_partial_count() {
    let generator = generator_with(
        GeneratorOptions::default().with_seed(13),
        vec![RawDefinition::new("Test", ["a", "b"])],
    );

    let mut messages = generator.generate("Test", HashMap::new(), 5).await.unwrap();
    messages.sort();
    assert_eq!(messages, ["a", "b"]);
}

#[tokio::test]
async fn test_bounded_concurrency_explores_everything() {
    let generator = generator_with(
        GeneratorOptions::default().with_seed(14).with_max_concurrency(1),
        vec![
            RawDefinition::new("Test", ["{{.Left}}{{.Right}}"]),
            RawDefinition::new("Left", ["1", "2", "3"]),
            RawDefinition::new("Right", ["x", "y"]),
        ],
    );

    let messages = generator.generate("Test", HashMap::new(), 10).await.unwrap();
    assert_eq!(messages.len(), 6);
}

#[tokio::test]
async fn test_priority_ordering_appends_stage() {
    let options = GeneratorOptions::default().with_priority_ordering();
    assert_eq!(
        options.definition_pipeline.stage_names(),
        [
            "ConstraintsSatisfiedDefinitionPicker",
            "RandomWithWeightDefinitionPicker",
            "SortByConstraintPriorityDefinitionPicker"
        ]
    );
}

#[tokio::test]
async fn test_running_generation_keeps_its_snapshot() {
    let generator = generator_with(
        GeneratorOptions::default().with_seed(15),
        vec![
            RawDefinition::new("Test", ["a{{.X}}"]),
            RawDefinition::new("X", ["1"]),
        ],
    );

    let stream = generator.start("Test", State::new()).unwrap();
    generator.add_definitions([RawDefinition::new("X", ["2"])]).unwrap();

    let messages: Vec<String> = stream.map(|r| r.unwrap().message).collect().await;
    assert_eq!(messages, ["a1"]);

    let mut later = generator.generate("Test", HashMap::new(), 5).await.unwrap();
    later.sort();
    assert_eq!(later, ["a1", "a2"]);
}

#[tokio::test]
async fn test_cancelled_stream_terminates() {
    let generator = generator_with(
        GeneratorOptions::default().with_seed(16),
        vec![
            RawDefinition::new("Test", ["{{.A}}{{.B}}{{.C}}"]),
            RawDefinition::new("A", ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]),
            RawDefinition::new("B", ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]),
            RawDefinition::new("C", ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]),
        ],
    );

    let mut stream = generator.start("Test", State::new()).unwrap();
    assert!(stream.next().await.unwrap().is_ok());
    stream.cancel();
    assert!(stream.is_cancelled());

    // Only what was already buffered, plus at most one send in flight, is delivered
    let rest: Vec<_> = stream.collect().await;
    assert!(rest.len() <= MESSAGE_CHANNEL_CAPACITY + 1, "{} results after cancel", rest.len());
}

#[tokio::test]
async fn test_dropping_stream_cancels_search() {
    let generator =
        generator_with(GeneratorOptions::default(), vec![RawDefinition::new("Test", ["a"])]);

    let stream = generator.start("Test", State::new()).unwrap();
    let token = stream.cancellation_token();
    assert!(!token.is_cancelled());
    drop(stream);
    assert!(token.is_cancelled());
}
