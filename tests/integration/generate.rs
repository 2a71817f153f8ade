use futures::StreamExt;
use phrasegen::config::load_definitions;
use phrasegen::core::PhrasegenError;
use phrasegen::generator::{Generator, GeneratorOptions};
use phrasegen::state::State;
use phrasegen::test_utils::{init_test_logging, state_of};
use std::collections::{HashMap, HashSet};

use crate::fixture_source;

async fn generator_from(fixture: &str, options: GeneratorOptions) -> Generator {
    let config = load_definitions(&fixture_source(fixture)).await.unwrap();
    let generator = Generator::new(options);
    generator.add_definitions(config.definitions).unwrap();
    generator
}

fn gender_of(first_name: &str) -> &'static str {
    match first_name {
        "Alice" | "Carol" => "Female",
        "Bob" | "Dave" => "Male",
        other => panic!("Unexpected first name {other}"),
    }
}

/// Every message of the pronouns file, with pronouns agreeing with the first name
#[tokio::test]
async fn test_pronouns_exhaustive() {
    init_test_logging(None);
    let generator = generator_from("pronouns.yaml", GeneratorOptions::default().with_seed(3)).await;
    assert_eq!(generator.definition_types(), ["FirstName", "LastName", "Pronoun", "Root"]);

    let messages = generator.generate("Root", HashMap::new(), 20).await.unwrap();
    assert_eq!(messages.len(), 8);
    assert_eq!(messages.iter().collect::<HashSet<_>>().len(), 8);

    for message in &messages {
        let first_name = message.split(' ').next().unwrap();
        let pronoun = if gender_of(first_name) == "Female" { "she" } else { "he" };
        assert!(message.contains(&format!(" said {pronoun} would come.")), "{message}");
    }
}

/// An initial gender restricts which first names can be injected
#[tokio::test]
async fn test_pronouns_with_initial_state() {
    let generator = generator_from("pronouns.yaml", GeneratorOptions::default().with_seed(4)).await;

    let messages = generator.generate("Root", state_of(&[("Gender", "Male")]), 20).await.unwrap();
    assert_eq!(messages.len(), 4);
    for message in &messages {
        assert!(message.starts_with("Bob ") || message.starts_with("Dave "), "{message}");
        assert!(message.ends_with("said he would come."), "{message}");
    }
}

/// Resolutions expose the bindings that produced each message
#[tokio::test]
async fn test_stream_states() {
    let generator = generator_from("pronouns.yaml", GeneratorOptions::default().with_seed(5)).await;

    let resolutions: Vec<_> = generator
        .start("Root", State::new())
        .unwrap()
        .map(|result| result.unwrap())
        .collect()
        .await;
    assert_eq!(resolutions.len(), 8);

    for resolution in &resolutions {
        let state = &resolution.state;
        let first_name = state.get("FirstName").unwrap();
        assert_eq!(state.get("Gender"), Some(gender_of(first_name)));
        assert_eq!(state.get("Root"), Some(resolution.message.as_str()));
        assert!(state.contains("LastName"));
        assert!(state.contains("Pronoun"));
    }
}

/// Aliases of one type never repeat a template, and constraints follow the season
#[tokio::test]
async fn test_weather_aliases_and_optional_constraints() {
    let generator = generator_from("weather.yaml", GeneratorOptions::default().with_seed(6)).await;

    let summer = generator.generate("Root", state_of(&[("Season", "Summer")]), 50).await.unwrap();
    assert!(summer.iter().any(|m| m.contains("Scorching")));
    assert!(summer.iter().all(|m| !m.contains("Snowy")));

    let winter = generator.generate("Root", state_of(&[("Season", "Winter")]), 50).await.unwrap();
    assert!(winter.iter().any(|m| m.contains("Snowy")));
    assert!(winter.iter().all(|m| !m.contains("Scorching")));

    for message in summer.iter().chain(&winter) {
        if let Some((morning, rest)) = message.split_once(" in the morning, ") {
            let evening = rest.trim_end_matches(" by evening.");
            assert_ne!(morning, evening, "{message}");
        }
    }
}

/// A season no constraint accepts leaves only the unconstrained and optional skies
#[tokio::test]
async fn test_weather_without_season() {
    let generator = generator_from("weather.yaml", GeneratorOptions::default().with_seed(7)).await;

    let messages = generator.generate("Root", HashMap::new(), 50).await.unwrap();
    assert!(messages.iter().all(|m| !m.contains("Scorching")));
    assert!(messages.iter().any(|m| m.contains("Snowy")));
    assert!(messages.contains(&"Sunny all day.".to_string()));
}

/// The length validator prunes the long template entirely
#[tokio::test]
async fn test_weather_max_length() {
    let generator =
        generator_from("weather.yaml", GeneratorOptions::default().with_seed(8).with_max_length(16))
            .await;

    let messages = generator.generate("Root", HashMap::new(), 50).await.unwrap();
    assert!(!messages.is_empty());
    for message in &messages {
        assert!(message.ends_with(" all day."), "{message}");
        assert!(message.chars().count() <= 16, "{message}");
    }
}

/// Same seed, same file, same output
#[tokio::test]
async fn test_seeded_generation_is_reproducible() {
    let first = generator_from("weather.yaml", GeneratorOptions::default().with_seed(99)).await;
    let second = generator_from("weather.yaml", GeneratorOptions::default().with_seed(99)).await;

    let a = first.generate("Root", HashMap::new(), 5).await.unwrap();
    let b = second.generate("Root", HashMap::new(), 5).await.unwrap();
    assert_eq!(a, b);
}

/// Invalid constraint keys are rejected at registration with the offending key
#[tokio::test]
async fn test_invalid_constraint_key_file() {
    let config = load_definitions(&fixture_source("invalid_key.yaml")).await.unwrap();
    let generator = Generator::default();

    let err = generator.add_definitions(config.definitions).unwrap_err();
    match err {
        PhrasegenError::InvalidConstraintKey {
            key,
            ..
        } => assert_eq!(key, "Gender!?"),
        other => panic!("Expected InvalidConstraintKey, got {other:?}"),
    }
    // The record before the invalid one stays registered
    assert_eq!(generator.definition_types(), ["Root"]);
}

/// Cycles and dead references still generate through the remaining branches
#[tokio::test]
async fn test_cyclic_definitions_terminate() {
    let generator =
        generator_from("cyclic.yaml", GeneratorOptions::default().with_seed(9).with_max_depth(8))
            .await;

    let messages = generator.generate("Root", HashMap::new(), 3).await.unwrap();
    assert_eq!(messages, ["done"]);
}
