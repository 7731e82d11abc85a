//! Board dealing
//!
//! A board of dimension `d` holds `d²` cards: `d²/2` pairing keys, each dealt
//! twice. Keys are backed by artwork images; when the catalog is smaller than
//! the number of pairs, images are reused across keys, but a key itself never
//! appears on more than two cards.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::shuffle::{pick_random, shuffle};
use crate::error::{GameError, Result};

/// Identifier shared by exactly two cards on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey(pub u32);

/// Which side of a card is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CardFace {
    #[default]
    FaceDown,
    FaceUp,
    /// Terminal: matched cards stay face-up for the rest of the game
    Matched,
}

/// A single card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub key: PairKey,
    /// Artwork index (0-based) in the image catalog
    pub image: usize,
    pub face: CardFace,
}

impl Card {
    pub fn new(key: PairKey, image: usize) -> Self {
        Self {
            key,
            image,
            face: CardFace::FaceDown,
        }
    }

    #[inline]
    pub fn is_face_down(&self) -> bool {
        self.face == CardFace::FaceDown
    }

    #[inline]
    pub fn is_matched(&self) -> bool {
        self.face == CardFace::Matched
    }

    /// Face-up but not yet part of a match
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.face == CardFace::FaceUp
    }
}

/// Dealt cards in grid order (row-major)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    dimension: u32,
    cards: Vec<Card>,
}

impl Board {
    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub(crate) fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn all_matched(&self) -> bool {
        self.cards.iter().all(Card::is_matched)
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.is_matched()).count() / 2
    }

    /// Indices of face-up, unmatched cards (in board order)
    pub fn pending_indices(&self) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_pending())
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the other card carrying the same key
    pub fn partner_of(&self, index: usize) -> Option<usize> {
        let key = self.cards.get(index)?.key;
        self.cards
            .iter()
            .enumerate()
            .position(|(i, c)| i != index && c.key == key)
    }
}

/// Read the `data-dimension` attribute of the board container
pub fn parse_dimension(raw: &str) -> Result<u32> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| GameError::invalid_dimension(raw))?;
    let dimension = u32::try_from(value).map_err(|_| GameError::invalid_dimension(raw))?;
    validate_dimension(dimension)?;
    Ok(dimension)
}

fn validate_dimension(dimension: u32) -> Result<usize> {
    if dimension == 0 || dimension % 2 != 0 {
        return Err(GameError::invalid_dimension(dimension));
    }
    (dimension as usize)
        .checked_mul(dimension as usize)
        .ok_or_else(|| GameError::invalid_dimension(dimension))
}

/// Deal a shuffled `dimension x dimension` board
///
/// `max_unique_images` is the size of the artwork catalog. Which catalog
/// entries are used is drawn at random, then `pair_count` keys are mapped onto
/// them round-robin.
pub fn build_board<R: Rng + ?Sized>(
    dimension: u32,
    max_unique_images: usize,
    rng: &mut R,
) -> Result<Board> {
    let total = validate_dimension(dimension)?;
    let pair_count = total / 2;
    let image_count = pair_count.min(max_unique_images);
    if image_count == 0 {
        return Err(GameError::InvalidArgument {
            requested: pair_count,
            available: max_unique_images,
        });
    }

    let catalog: Vec<usize> = (0..max_unique_images).collect();
    let images = pick_random(&catalog, image_count, rng)?;

    let keys: Vec<PairKey> = (0..pair_count as u32).map(PairKey).collect();
    let doubled: Vec<PairKey> = keys.iter().chain(keys.iter()).copied().collect();
    let cards = shuffle(&doubled, rng)
        .into_iter()
        .map(|key| Card::new(key, images[key.0 as usize % image_count]))
        .collect();

    log::debug!(
        "Dealt {}x{} board: {} pairs over {} images",
        dimension,
        dimension,
        pair_count,
        image_count
    );

    Ok(Board { dimension, cards })
}

#[cfg(test)]
impl Board {
    /// Unshuffled board for tests: keys laid out as 0,0,1,1,2,2,...
    pub(crate) fn sorted(dimension: u32) -> Self {
        let pair_count = (dimension * dimension / 2) as usize;
        let cards = (0..pair_count)
            .flat_map(|k| [Card::new(PairKey(k as u32), k), Card::new(PairKey(k as u32), k)])
            .collect();
        Self { dimension, cards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashMap;

    fn key_counts(board: &Board) -> HashMap<PairKey, usize> {
        let mut counts = HashMap::new();
        for card in board.cards() {
            *counts.entry(card.key).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_rejects_odd_and_zero_dimension() {
        let mut rng = Pcg32::seed_from_u64(1);
        for d in [0, 1, 3, 7] {
            assert!(matches!(
                build_board(d, 23, &mut rng),
                Err(GameError::InvalidDimension { .. })
            ));
        }
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("4").unwrap(), 4);
        assert_eq!(parse_dimension(" 6 ").unwrap(), 6);
        for raw in ["", "abc", "-4", "0", "5", "4.0"] {
            assert!(
                matches!(parse_dimension(raw), Err(GameError::InvalidDimension { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_cards_start_face_down() {
        let mut rng = Pcg32::seed_from_u64(5);
        let board = build_board(4, 23, &mut rng).unwrap();
        assert!(board.cards().iter().all(Card::is_face_down));
        assert_eq!(board.dimension(), 4);
        assert_eq!(board.pair_count(), 8);
    }

    #[test]
    fn test_images_reused_when_catalog_is_small() {
        // 8x8 = 32 pairs over a 23 image catalog
        let mut rng = Pcg32::seed_from_u64(9);
        let board = build_board(8, 23, &mut rng).unwrap();
        assert_eq!(board.len(), 64);
        assert!(key_counts(&board).values().all(|&n| n == 2));

        let mut images: Vec<usize> = board.cards().iter().map(|c| c.image).collect();
        images.sort();
        images.dedup();
        assert_eq!(images.len(), 23);
        assert!(images.iter().all(|&i| i < 23));
    }

    #[test]
    fn test_cards_sharing_key_share_image() {
        let mut rng = Pcg32::seed_from_u64(11);
        let board = build_board(6, 23, &mut rng).unwrap();
        for (i, card) in board.cards().iter().enumerate() {
            let partner = board.partner_of(i).unwrap();
            assert_ne!(partner, i);
            assert_eq!(board.cards()[partner].image, card.image);
        }
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(matches!(
            build_board(2, 0, &mut rng),
            Err(GameError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_deal() {
        let a = build_board(4, 23, &mut Pcg32::seed_from_u64(77)).unwrap();
        let b = build_board(4, 23, &mut Pcg32::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_every_key_dealt_twice(half in 1u32..=10, images in 1usize..40, seed in any::<u64>()) {
            let d = half * 2;
            let mut rng = Pcg32::seed_from_u64(seed);
            let board = build_board(d, images, &mut rng).unwrap();
            prop_assert_eq!(board.len(), (d * d) as usize);
            let counts = key_counts(&board);
            prop_assert_eq!(counts.len(), (d * d / 2) as usize);
            prop_assert!(counts.values().all(|&n| n == 2));
        }
    }
}
