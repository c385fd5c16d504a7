use sentimentopolis::{emoji_to_names, fold_typography, normalize, LexicalScorer, Scorer};

#[test]
fn strips_links_mentions_and_markup_and_names_emoji() {
    assert_eq!(normalize("check http://x.co /u/bob <b>hi</b>!!! 😀"), "check hi!!! :grinning_face:");
}

#[test]
fn urls_in_all_common_shapes_are_removed() {
    assert_eq!(normalize("see https://example.com/a?b=c ok"), "see ok");
    assert_eq!(normalize("www.bungie.net/7/en/News is down"), "is down");
    assert_eq!(normalize("FTP://files.local/x.zip works"), "works");
}

#[test]
fn links_stop_at_brackets_and_trailing_punctuation() {
    assert_eq!(normalize("(see http://x.co)"), "(see )");
    assert_eq!(normalize("[patch notes](https://x.co/notes) are out"), "patch notes are out");
    assert_eq!(normalize("read https://x.co/notes. then cry"), "read . then cry");
    assert_eq!(normalize("both www.x.co, and http://y.co!"), "both , and !");
}

#[test]
fn anchors_keep_their_text_and_lose_the_markup() {
    assert_eq!(normalize(r#"see <a href="http://x.co">the patch</a> now"#), "see the patch now");
    assert_eq!(normalize(r#"<a href='https://x.co/a?b=c'>link</a>"#), "link");
    assert_eq!(normalize(r#"<img src="http://x.co/i.png">nice"#), "nice");
}

#[test]
fn mentions_are_removed() {
    assert_eq!(normalize("thanks @user_1 for this"), "thanks for this");
    assert_eq!(normalize("u/Cozmo23 said so"), "said so");
    assert_eq!(normalize("ask /u/dmg04 about it"), "ask about it");
    // Only a leading @ starts a mention.
    assert_eq!(normalize("mail me at a@b"), "mail me at ab");
}

#[test]
fn inline_tags_join_and_block_tags_separate() {
    assert_eq!(normalize("un<i>believ</i>able"), "unbelievable");
    assert_eq!(normalize("line<br>next"), "line next");
    assert_eq!(normalize("<p>first</p><p>second</p>"), "first second");
    assert_eq!(normalize("<span class=\"spoiler\">Xur</span> is here"), "xur is here");
}

#[test]
fn entities_are_decoded_then_filtered() {
    assert_eq!(normalize("&quot;nerf&quot; it"), "\"nerf\" it");
    assert_eq!(normalize("don&#39;t"), "don't");
    // '&' and '<' are not kept after decoding.
    assert_eq!(normalize("Tom &amp; Jerry"), "tom jerry");
    assert_eq!(normalize("1 &lt; 2"), "1 2");
}

#[test]
fn typography_folds_to_ascii_before_filtering() {
    assert_eq!(fold_typography("it\u{2019}s \u{201C}fine\u{201D}"), "it's \"fine\"");
    assert_eq!(fold_typography("wait\u{2026}"), "wait...");
    assert_eq!(normalize("It\u{2019}s \u{201C}great\u{201D} \u{2014} really\u{2026}"), "it's \"great\" - really...");
    assert_eq!(normalize("a\u{00A0}b"), "a b");
}

#[test]
fn whitespace_collapses_and_case_folds() {
    assert_eq!(normalize("  WOW \t\n  Such   LOOT  "), "wow such loot");
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("   \n\t "), "");
    assert_eq!(normalize("<br><br>"), "");
}

#[test]
fn disallowed_symbols_are_dropped_and_letters_kept() {
    assert_eq!(normalize("50% off [today] #hype $$$"), "50% off today hype");
    assert_eq!(normalize("Café déjà vu"), "café déjà vu");
}

#[test]
fn emoji_become_name_tokens() {
    assert_eq!(emoji_to_names("hi😀"), "hi :grinning_face: ");
    assert_eq!(normalize("love it \u{2764}\u{FE0F}"), "love it :red_heart:");
    assert_eq!(normalize("😀😀"), ":grinning_face: :grinning_face:");
}

#[test]
fn normalize_is_idempotent_on_clean_text() {
    let once = normalize("Great <b>raid</b>, thanks @dev! https://x.co");
    assert_eq!(normalize(&once), once);
}

#[test]
fn lexical_polarity_sign_and_range() {
    let lex = LexicalScorer::new();
    assert!(lex.polarity("good") > 0.0);
    assert!(lex.polarity("bad") < 0.0);
    assert_eq!(lex.polarity(""), 0.0);
    assert_eq!(lex.polarity("the table is round"), 0.0);

    for text in ["love love love love love love!!!!!!", "worst worst worst garbage trash", "meh but ok", "not bad"] {
        let v = lex.polarity(text);
        assert!(v > -1.0 && v < 1.0, "{text}: {v}");
    }
}

#[test]
fn lexical_modifiers_shift_the_score() {
    let lex = LexicalScorer::new();
    let good = lex.polarity("good");
    assert!(lex.polarity("not good") < 0.0);
    assert!(lex.polarity("very good") > good);
    assert!(lex.polarity("slightly good") < good);
    assert!(lex.polarity("good!!!") > good);
    assert!(lex.polarity("dont like it") < 0.0);
    // Text after "but" dominates.
    assert!(lex.polarity("the raid was bad but the loot is great") > 0.0);
}

#[test]
fn lexical_scores_emoji_tokens() {
    let lex = LexicalScorer::new();
    assert!(lex.polarity(&normalize("😀")) > 0.0);
    assert!(lex.polarity(&normalize("\u{1F44E}")) < 0.0);
}

#[test]
fn lexicon_entries_can_be_added_and_are_clamped() {
    let lex = LexicalScorer::new().with_entry("Sunsetting", -2.0);
    assert!(lex.polarity("sunsetting") < 0.0);

    let a = LexicalScorer::new().with_entry("raid", 10.0).polarity("raid");
    let b = LexicalScorer::new().with_entry("raid", 4.0).polarity("raid");
    assert_eq!(a, b);
}

#[test]
fn default_batch_score_is_the_mean() {
    let lex = LexicalScorer::new();
    let texts = vec!["good".to_string(), "bad".to_string(), "meh".to_string()];
    let expected = texts.iter().map(|t| lex.polarity(t)).sum::<f64>() / 3.0;
    let got = lex.score_batch(&texts).unwrap().unwrap();
    assert!((got - expected).abs() < 1e-15);
    assert_eq!(lex.score_batch(&[]).unwrap(), None);
}
