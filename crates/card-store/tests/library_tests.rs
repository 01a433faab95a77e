use card_store::{CardLibrary, StoreError};
use image::{Rgba, RgbaImage};

fn sample_card(shade: u8) -> RgbaImage {
    RgbaImage::from_pixel(63, 88, Rgba([shade, shade, 200, 255]))
}

fn library() -> (tempfile::TempDir, CardLibrary) {
    let dir = tempfile::tempdir().unwrap();
    let library = CardLibrary::new(dir.path());
    (dir, library)
}

#[tokio::test]
async fn games_and_decks_round_trip() {
    let (_dir, library) = library();
    assert!(library.games().await.unwrap().is_empty());

    let game = library.create_game("My Game").await.unwrap();
    assert_eq!(game, "My Game");
    assert_eq!(library.games().await.unwrap(), vec!["My Game"]);

    let deck = library.add_deck(&game, "Heroes", 63.0, 88.0).await.unwrap();
    assert_eq!(deck.folder, "Heroes");
    assert_eq!(deck.width_mm, 63.0);

    let decks = library.decks(&game).await.unwrap();
    assert_eq!(decks, vec![deck.clone()]);
    assert_eq!(library.find_deck(&game, "Heroes").await.unwrap(), deck);
}

#[tokio::test]
async fn duplicate_games_and_decks_are_rejected() {
    let (_dir, library) = library();
    let game = library.create_game("g").await.unwrap();
    assert!(matches!(
        library.create_game("g").await,
        Err(StoreError::AlreadyExists(_))
    ));

    library.add_deck(&game, "d", 63.0, 88.0).await.unwrap();
    assert!(matches!(
        library.add_deck(&game, "d", 70.0, 120.0).await,
        Err(StoreError::AlreadyExists(_))
    ));
}

#[tokio::test]
async fn cards_round_trip_with_counts() {
    let (_dir, library) = library();
    let game = library.create_game("g").await.unwrap();
    library.add_deck(&game, "d", 63.0, 88.0).await.unwrap();

    let name = library
        .save_card(&game, "d", sample_card(10), Some("ace"), 3)
        .await
        .unwrap();
    assert_eq!(name, "ace");

    // Unnamed cards are auto-numbered.
    let auto = library
        .save_card(&game, "d", sample_card(20), None, 1)
        .await
        .unwrap();
    assert_eq!(auto, "card_002");

    let cards = library.list_cards(&game, "d").await.unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].name, "ace");
    assert_eq!(cards[0].count, 3);
    assert_eq!(cards[1].name, "card_002");
    assert_eq!(cards[1].count, 1);

    let image = library.retrieve(&game, "d", "ace").await.unwrap();
    assert_eq!(image.dimensions(), (63, 88));
    assert_eq!(image.get_pixel(0, 0)[0], 10);
}

#[tokio::test]
async fn retrieve_missing_card_is_not_found() {
    let (_dir, library) = library();
    let game = library.create_game("g").await.unwrap();
    library.add_deck(&game, "d", 63.0, 88.0).await.unwrap();

    assert!(matches!(
        library.retrieve(&game, "d", "ghost").await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn counts_renames_and_deletes_apply() {
    let (_dir, library) = library();
    let game = library.create_game("g").await.unwrap();
    library.add_deck(&game, "d", 63.0, 88.0).await.unwrap();
    library
        .save_card(&game, "d", sample_card(10), Some("ace"), 1)
        .await
        .unwrap();

    library.set_count(&game, "d", "ace", 4).await.unwrap();
    assert_eq!(library.list_cards(&game, "d").await.unwrap()[0].count, 4);

    library.rename_card(&game, "d", "ace", "king").await.unwrap();
    let cards = library.list_cards(&game, "d").await.unwrap();
    assert_eq!(cards[0].name, "king");
    assert_eq!(cards[0].count, 4);

    library.delete_card(&game, "d", "king").await.unwrap();
    assert!(library.list_cards(&game, "d").await.unwrap().is_empty());
}

#[tokio::test]
async fn moving_a_card_carries_its_count() {
    let (_dir, library) = library();
    let game = library.create_game("g").await.unwrap();
    library.add_deck(&game, "a", 63.0, 88.0).await.unwrap();
    library.add_deck(&game, "b", 63.0, 88.0).await.unwrap();
    library
        .save_card(&game, "a", sample_card(10), Some("ace"), 5)
        .await
        .unwrap();

    library.move_card(&game, "a", "ace", "b").await.unwrap();
    assert!(library.list_cards(&game, "a").await.unwrap().is_empty());
    let cards = library.list_cards(&game, "b").await.unwrap();
    assert_eq!(cards[0].name, "ace");
    assert_eq!(cards[0].count, 5);
}

#[tokio::test]
async fn back_image_is_shared_and_not_a_card() {
    let (_dir, library) = library();
    let game = library.create_game("g").await.unwrap();
    library.add_deck(&game, "d", 63.0, 88.0).await.unwrap();

    assert!(library.back_image(&game, "d").await.unwrap().is_none());
    library
        .set_back(&game, "d", sample_card(99))
        .await
        .unwrap();

    let back = library.back_image(&game, "d").await.unwrap().unwrap();
    assert_eq!(back.get_pixel(0, 0)[0], 99);

    // back.png never shows up in the card listing.
    library
        .save_card(&game, "d", sample_card(10), Some("ace"), 1)
        .await
        .unwrap();
    let cards = library.list_cards(&game, "d").await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "ace");
}
