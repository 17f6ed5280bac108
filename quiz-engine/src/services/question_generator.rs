use rand::rng;
use rand::seq::SliceRandom;

use crate::error::QuizError;
use crate::models::{Flashcard, Question};

/// A session never asks more than this many questions, regardless of deck
/// size.
pub const MAX_QUESTIONS: usize = 10;

/// Sample a deck's flashcards into a randomized question sequence:
/// uniform shuffle, then the first `min(10, N)` cards, each becoming one
/// identification question (prompt = term, expected answer = definition).
///
/// Stateless; two calls need not produce the same order. Fails before any
/// session state exists when the deck is empty.
pub fn generate(deck_id: &str, flashcards: &[Flashcard]) -> Result<Vec<Question>, QuizError> {
    if flashcards.is_empty() {
        return Err(QuizError::EmptyDeck {
            deck_id: deck_id.to_string(),
        });
    }

    let mut pool: Vec<&Flashcard> = flashcards.iter().collect();
    pool.shuffle(&mut rng());

    Ok(pool
        .into_iter()
        .take(MAX_QUESTIONS)
        .map(|card| Question::Identification {
            id: card.id.clone(),
            prompt: card.term.clone(),
            expected_answer: card.definition.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn deck_of(n: usize) -> Vec<Flashcard> {
        (0..n)
            .map(|i| Flashcard {
                id: format!("card-{}", i),
                term: format!("term {}", i),
                definition: format!("definition {}", i),
            })
            .collect()
    }

    #[test]
    fn empty_deck_is_an_error() {
        let err = generate("deck-1", &[]).unwrap_err();
        assert!(matches!(err, QuizError::EmptyDeck { .. }));
    }

    #[test]
    fn small_deck_uses_every_card() {
        let questions = generate("deck-1", &deck_of(4)).unwrap();
        assert_eq!(questions.len(), 4);
    }

    #[test]
    fn large_deck_is_capped_at_ten() {
        let questions = generate("deck-1", &deck_of(25)).unwrap();
        assert_eq!(questions.len(), MAX_QUESTIONS);
    }

    #[test]
    fn selected_flashcards_are_unique() {
        for _ in 0..20 {
            let questions = generate("deck-1", &deck_of(25)).unwrap();
            let ids: HashSet<&str> = questions.iter().map(|q| q.id()).collect();
            assert_eq!(ids.len(), questions.len());
        }
    }

    #[test]
    fn questions_map_term_to_prompt() {
        let questions = generate("deck-1", &deck_of(1)).unwrap();
        match &questions[0] {
            Question::Identification {
                prompt,
                expected_answer,
                ..
            } => {
                assert_eq!(prompt, "term 0");
                assert_eq!(expected_answer, "definition 0");
            }
            other => panic!("unexpected question kind: {:?}", other),
        }
    }
}
