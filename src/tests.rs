#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};

    use itertools::Itertools;

    use crate::arrange::{arrange, ArrangeConfig, ArrangeShortfall, Arranger};
    use crate::bank::{
        emoji_hex_sequence, normalize_hex, BankFilter, Dialect, Position, PositionFilter, ShapeGroup, Sound, SyllableShape,
        WordBank, WordEntry,
    };
    use crate::connector::{connector_endpoints, connector_geometries, ConnectorShape, FootprintStyle, Mark};
    use crate::icons::{icon_urls, ColorMode, IconCache, IconFetchError, IconKey, IconSource};
    use crate::layout::{BoardLayout, Point, Rect};
    use crate::location::{Location, Square};
    use crate::mask::OccupancyMask;
    use crate::prng::derive_seed;
    use crate::item::Categorized;
    use crate::session::{fresh_seed, BoardSettings, GenerateError, Generator, Session, SettingsError};
    use crate::shape::{SquareStep, Step};
    use crate::spot::{IconDecision, SpotSearch};
    use crate::summary::{group_targets, BoardMeta};
    use crate::template::{ConnectorKind, ConnectorTemplate, TemplateError};
    use crate::topology::BoardTopology;

    fn sq(n: u8) -> Square {
        Square::new(n).unwrap()
    }

    fn slot(n: u8) -> usize {
        sq(n).slot().unwrap()
    }

    fn b_initial_closed() -> BoardSettings {
        BoardSettings {
            sounds: vec![Sound::B],
            position: PositionFilter::Initial,
            shape_group: ShapeGroup::ClosedSyllables,
            ..BoardSettings::default()
        }
    }

    fn word(orth: &str, sound: Sound) -> WordEntry {
        WordEntry {
            orth: orth.to_string(),
            sound,
            pos: Position::Initial,
            shape: SyllableShape::CVC,
            shapes: Default::default(),
            emoji: "🐝".to_string(),
            hex: String::new(),
        }
    }

    struct FakeSource {
        calls: RefCell<Vec<String>>,
        fails: fn(&str) -> bool,
    }

    impl FakeSource {
        fn new(fails: fn(&str) -> bool) -> Self {
            Self { calls: RefCell::new(Vec::new()), fails }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl IconSource for FakeSource {
        type Icon = String;

        fn fetch(&self, url: &str) -> Result<Self::Icon, IconFetchError> {
            self.calls.borrow_mut().push(url.to_string());
            if (self.fails)(url) {
                Err(IconFetchError::Status(404))
            } else {
                Ok(url.to_string())
            }
        }
    }

    impl IconSource for &FakeSource {
        type Icon = String;

        fn fetch(&self, url: &str) -> Result<Self::Icon, IconFetchError> {
            (*self).fetch(url)
        }
    }

    #[test]
    fn serpentine_locations() {
        assert_eq!(sq(1).location(), Location(0, 0));
        assert_eq!(sq(10).location(), Location(9, 0));
        assert_eq!(sq(11).location(), Location(9, 1));
        assert_eq!(sq(19).location(), Location(1, 1));
        assert_eq!(sq(20).location(), Location(0, 1));
        assert_eq!(sq(100).location(), Location(0, 9));

        for n in 1..=100 {
            assert_eq!(Square::from_location(sq(n).location()), Some(sq(n)));
        }
        assert_eq!(Square::new(0), None);
        assert_eq!(Square::new(101), None);
        assert_eq!(Square::from_slot(0), Some(sq(2)));
        assert_eq!(Square::from_slot(97), Some(sq(99)));
        assert_eq!(Square::from_slot(98), None);
        assert_eq!(Square::START.slot(), None);
    }

    #[test]
    fn steps_follow_the_grid() {
        assert_eq!(SquareStep::Up.attempt_from(sq(10).location()), sq(11).location());
        assert_eq!(SquareStep::Right.attempt_from(sq(2).location()), sq(3).location());
        assert_eq!(SquareStep::Left.attempt_from(sq(12).location()), sq(13).location());
        assert!(!SquareStep::Down.attempt_from(sq(5).location()).in_bounds());
        for dir in SquareStep::FORWARD_VARIANTS {
            assert!(dir.attempt_from(Location(4, 4)) > Location(4, 4));
        }
    }

    #[test]
    fn interior_squares_have_distinct_coordinates() {
        let locations: HashSet<Location> = (2..=99).map(|n| sq(n).location()).collect();
        assert_eq!(locations.len(), 98);
        assert!(locations.iter().all(|l| l.in_bounds()));
    }

    #[test]
    fn topology_neighbours() {
        let topology = BoardTopology::classic();
        assert_eq!(topology.slots(), 98);

        // square 2 touches 3 and 19 but not START
        assert_eq!(topology.neighbors(slot(2)), &[slot(3), slot(19)]);
        // square 99 touches 98 and 82 but not FINISH
        assert_eq!(topology.neighbors(slot(99)), &[slot(82), slot(98)]);

        assert!(topology.are_adjacent(slot(10), slot(11)));
        assert!(!topology.are_adjacent(slot(10), slot(12)));
        assert!(topology.neighbors(500).is_empty());
    }

    #[test]
    fn topology_is_symmetric_and_complete() {
        let topology = BoardTopology::classic();
        for a in 0..topology.slots() {
            assert!(!topology.are_adjacent(a, a));
            for &b in topology.neighbors(a) {
                assert!(topology.are_adjacent(b, a));
            }
        }
        // 180 grid edges, minus two each at START and FINISH
        assert_eq!(topology.adjacent_pairs().count(), 176);
        assert_eq!(topology.square_at(Location(0, 0)), None);
        assert_eq!(topology.square_at(Location(9, 1)), Some(sq(11)));
    }

    #[test]
    fn topology_display() {
        let text = format!("{}", BoardTopology::classic());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], " . 99 98 97 96 95 94 93 92 91");
        assert_eq!(lines[9], " .  2  3  4  5  6  7  8  9 10");
    }

    #[test]
    fn arrange_three_categories() {
        let items: Vec<(&str, usize)> = (0..40).flat_map(|i| ["a", "b", "c"].map(|c| (c, i))).collect();
        let topology = BoardTopology::classic();

        for seed in [1, 2, 3] {
            let result = arrange(&items, seed);
            assert!(result.ok);
            assert!(result.reason().is_empty());
            assert_eq!(result.arranged.len(), 98);
            assert!(result.arranged.iter().all(Option::is_some));
            assert!((1..=180).contains(&result.attempts));
            assert!(result.conflicts(&topology).is_empty());
        }
    }

    #[test]
    fn arrange_three_categories_at_seed_42() {
        let items: Vec<(&str, usize)> = ["A", "B", "C"].iter().flat_map(|c| (0..40).map(move |i| (*c, i))).collect();
        let result = arrange(&items, 42);
        assert!(result.ok);
        assert!(result.attempts <= 180);
        assert!(result.conflicts(&BoardTopology::classic()).is_empty());
    }

    #[test]
    fn arrange_one_category_at_seed_7() {
        let items: Vec<(&str, usize)> = (0..5).map(|i| ("A", i)).collect();
        let result = arrange(&items, 7);
        assert!(!result.ok);
        assert_eq!(result.attempts, 180);
        assert_eq!(result.arranged.len(), 98);
        assert!(result.arranged.iter().all(|i| i.map(|(c, _)| c) == Some("A")));
    }

    #[test]
    fn arrange_empty_pool_at_seed_0() {
        let items: Vec<(&str, usize)> = Vec::new();
        let result = arrange(&items, 0);
        assert!(!result.ok);
        assert_eq!(result.attempts, 0);
        assert_eq!(result.arranged.len(), 98);
        assert!(result.arranged.iter().all(Option::is_none));
    }

    #[test]
    fn arrange_treats_blank_words_as_empty() {
        let result = arrange(&["", ""], 3);
        assert!(!result.ok);
        assert_eq!(result.attempts, 0);
        assert_eq!(result.shortfall, Some(ArrangeShortfall::EmptyPool));
        assert!(result.arranged.iter().all(Option::is_none));

        assert!(word("", Sound::B).is_blank());
        assert!(!word("bus", Sound::B).is_blank());

        let mixed = arrange(&["", "a", "b"], 3);
        assert_ne!(mixed.shortfall, Some(ArrangeShortfall::EmptyPool));
        assert!(mixed.arranged.iter().all(Option::is_some));
    }

    #[test]
    fn arrangement_json_carries_reason_text() {
        let failed = serde_json::to_string(&arrange(&["a"], 7)).unwrap();
        assert!(failed.contains(r#""reason":"could not satisfy adjacency (pool too small / too repetitive)""#));
        assert!(!failed.contains("shortfall"));

        let empty = serde_json::to_value(arrange(&Vec::<&str>::new(), 0)).unwrap();
        assert_eq!(empty["reason"], "empty pool");
        assert_eq!(empty["attempts"], 0);

        let items: Vec<(&str, usize)> = ["A", "B", "C"].iter().flat_map(|c| (0..40).map(move |i| (*c, i))).collect();
        let fine = serde_json::to_value(arrange(&items, 42)).unwrap();
        assert_eq!(fine["ok"], true);
        assert_eq!(fine["reason"], "");
    }

    #[test]
    fn arrange_is_deterministic() {
        let items: Vec<&str> = vec!["bag", "bus", "bat", "bin", "bed", "bean", "bird", "bug", "ball", "bell"];
        let a = arrange(&items, 42);
        let b = arrange(&items, 42);
        assert_eq!(a.arranged, b.arranged);
        assert_eq!(a.attempts, b.attempts);
    }

    #[test]
    fn arrange_balances_the_pool() {
        let items: Vec<&str> = vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m"];
        let result = arrange(&items, 42);
        assert!(result.ok);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for item in result.arranged.iter().flatten() {
            *counts.entry(*item).or_default() += 1;
        }
        assert_eq!(counts.len(), 13);
        assert!(counts.values().all(|c| *c == 7 || *c == 8));
        assert_eq!(counts.values().sum::<usize>(), 98);
    }

    #[test]
    fn arrange_empty_pool() {
        let items: Vec<&str> = Vec::new();
        let result = arrange(&items, 7);
        assert!(!result.ok);
        assert_eq!(result.attempts, 0);
        assert_eq!(result.shortfall, Some(ArrangeShortfall::EmptyPool));
        assert_eq!(result.reason(), "empty pool");
        assert_eq!(result.arranged.len(), 98);
        assert!(result.arranged.iter().all(Option::is_none));
    }

    #[test]
    fn arrange_single_category_falls_back() {
        let items = vec!["dog"];
        let result = arrange(&items, 7);
        assert!(!result.ok);
        assert_eq!(result.attempts, 180);
        assert_eq!(result.reason(), "could not satisfy adjacency (pool too small / too repetitive)");
        assert_eq!(result.arranged.len(), 98);
        assert!(result.arranged.iter().all(|i| *i == Some("dog")));
        assert!(!result.conflicts(&BoardTopology::classic()).is_empty());
    }

    #[test]
    fn arrange_respects_attempt_budget() {
        let topology = BoardTopology::classic();
        let arranger = Arranger::new(&topology, ArrangeConfig { max_attempts: 5, ..ArrangeConfig::default() });
        let result = arranger.arrange(&["x", "x"], 1);
        assert!(!result.ok);
        assert_eq!(result.attempts, 5);
    }

    #[test]
    fn arrange_flags_are_honest() {
        let topology = BoardTopology::classic();
        for seed in 0..10 {
            let result = arrange(&["a", "b"], seed);
            assert_eq!(result.ok, result.conflicts(&topology).is_empty() && result.shortfall.is_none());
            assert_eq!(result.ok, result.reason().is_empty());
        }
    }

    #[test]
    fn arrangement_display() {
        let items: Vec<&str> = vec!["a", "b", "c", "d", "e", "f"];
        let result = arrange(&items, 3);
        let text = format!("{result}");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[0].starts_with('.'));
        assert!(lines[9].starts_with('.'));
        assert_eq!(result.placements().count(), 98);
        assert_eq!(result.item_at(Square::START), None);
    }

    #[test]
    fn classic_template() {
        let template = ConnectorTemplate::uk_classic();
        assert!(template.validate().is_ok());
        assert_eq!(template.connectors.iter().filter(|c| c.kind == ConnectorKind::Ladder).count(), 7);
        assert_eq!(template.connectors.iter().filter(|c| c.kind == ConnectorKind::Snake).count(), 8);
        assert!(!template.contains(ConnectorKind::Snake, 15, 4));
        assert!(template.contains(ConnectorKind::Snake, 24, 6));
        assert!(template.contains(ConnectorKind::Snake, 29, 10));
        assert!(template.contains(ConnectorKind::Ladder, 80, 99));

        assert_eq!(template.lane(ConnectorKind::Ladder, 6), -7.0);
        assert!((template.lane(ConnectorKind::Snake, 0) - (-14.0 * 0.55)).abs() < 1e-12);
    }

    #[test]
    fn template_from_json() {
        let partial = ConnectorTemplate::from_json(r#"{"lanes": [0]}"#).unwrap();
        assert_eq!(partial.connectors, ConnectorTemplate::uk_classic().connectors);
        assert_eq!(partial.lanes, vec![0.0]);

        let down = ConnectorTemplate::from_json(r#"{"connectors": [{"kind": "ladder", "from": 50, "to": 10}]}"#);
        assert!(matches!(down, Err(TemplateError::LadderGoesDown { .. })));

        let up = ConnectorTemplate::from_json(r#"{"connectors": [{"kind": "snake", "from": 10, "to": 50}]}"#);
        assert!(matches!(up, Err(TemplateError::SnakeGoesUp { .. })));

        let off_board = ConnectorTemplate::from_json(r#"{"connectors": [{"kind": "snake", "from": 101, "to": 50}]}"#);
        assert!(matches!(off_board, Err(TemplateError::Parse(_))));
    }

    #[test]
    fn layout_geometry() {
        let layout = BoardLayout::default();
        assert_eq!(layout.cell(), 90.0);
        assert_eq!(layout.square_rect(sq(1)), Rect::new(40.0, 1050.0, 90.0, 90.0));
        assert_eq!(layout.square_rect(sq(100)), Rect::new(40.0, 240.0, 90.0, 90.0));
        assert_eq!(layout.square_rect(sq(11)), Rect::new(850.0, 960.0, 90.0, 90.0));
        assert_eq!(layout.icon_base_size(), 56.0);
    }

    #[test]
    fn endpoints_are_inset_and_shifted() {
        let layout = BoardLayout::default();
        let template = ConnectorTemplate::uk_classic();
        let ladder = template.connectors[0];

        let plain = connector_endpoints(&layout, &template, &ladder, 0.0);
        let centre_distance = (layout.center_of(sq(23)) - layout.center_of(sq(2))).length();
        assert!((plain.length - (centre_distance - 2.0 * 27.0)).abs() < 1e-9);
        assert!((plain.direction.length() - 1.0).abs() < 1e-12);
        assert!((plain.direction.x * plain.normal.x + plain.direction.y * plain.normal.y).abs() < 1e-12);
        assert_eq!(plain.row_span(), 2);

        let shifted = connector_endpoints(&layout, &template, &ladder, 7.0);
        assert!((shifted.length - plain.length).abs() < 1e-9);
        let moved = shifted.start - plain.start;
        assert!((moved.length() - 7.0).abs() < 1e-9);
        assert!(((shifted.end - plain.end) - moved).length() < 1e-9);
    }

    #[test]
    fn geometries_follow_counters() {
        let layout = BoardLayout::default();
        let template = ConnectorTemplate::uk_classic();
        let style = FootprintStyle::default();
        let geometries = connector_geometries(&layout, &template, &style, 1000);
        assert_eq!(geometries.len(), 15);

        let ladder_lanes: Vec<f64> = geometries.iter().filter(|g| g.connector.kind == ConnectorKind::Ladder).map(|g| g.lane).collect();
        assert_eq!(ladder_lanes, vec![-14.0, -7.0, 0.0, 7.0, 14.0, -14.0, -7.0]);

        let snakes: Vec<_> = geometries.iter().filter(|g| g.connector.kind == ConnectorKind::Snake).collect();
        for (i, snake) in snakes.iter().enumerate() {
            let ConnectorShape::Snake { body, curve_sign, decor_seed } = &snake.shape else {
                panic!("snake laid out as a ladder");
            };
            let counter = i as u32 + 1;
            assert_eq!(*curve_sign, if counter % 2 == 0 { 1 } else { -1 });
            assert_eq!(*decor_seed, derive_seed(1000, counter));
            // every classic snake spans at least two rows
            assert_eq!(body.len(), 91);
            assert_eq!(snake.footprint(&style).len(), 2);
        }

        for ladder in geometries.iter().filter(|g| g.connector.kind == ConnectorKind::Ladder) {
            let ConnectorShape::Ladder { rungs, .. } = &ladder.shape else {
                panic!("ladder laid out as a snake");
            };
            assert!((6..=22).contains(&rungs.len()));
            assert_eq!(ladder.footprint(&style).len(), 2 + rungs.len());
        }
    }

    #[test]
    fn short_snakes_are_straight() {
        let layout = BoardLayout::default();
        let template = ConnectorTemplate::from_json(r#"{"connectors": [{"kind": "snake", "from": 15, "to": 4}]}"#).unwrap();
        let geometries = connector_geometries(&layout, &template, &FootprintStyle::default(), 0);
        let ConnectorShape::Snake { body, .. } = &geometries[0].shape else {
            panic!("expected a snake");
        };
        assert_eq!(body.len(), 2);
        assert_eq!(body[0], geometries[0].endpoints.start);
    }

    #[test]
    fn mask_covers_connectors() {
        let layout = BoardLayout::default();
        let style = FootprintStyle::default();
        let geometries = connector_geometries(&layout, &ConnectorTemplate::uk_classic(), &style, 0);
        let mask = OccupancyMask::build(&layout, &geometries, &style);

        assert_eq!(mask.width(), 980);
        assert_eq!(mask.height(), 1180);
        assert!(mask.covered_count() > 0);
        assert!(!mask.is_covered(0, 0));

        let ConnectorShape::Ladder { rails, .. } = &geometries[0].shape else {
            panic!("first connector is a ladder");
        };
        let mid = rails[0][0].lerp(rails[0][1], 0.5);
        assert!(mask.is_covered(mid.x.round() as usize, mid.y.round() as usize));

        let head = geometries[7].endpoints.start;
        assert!(mask.is_covered(head.x.round() as usize, head.y.round() as usize));
    }

    #[test]
    fn mask_rasterizes_marks() {
        let marks = vec![
            Mark::Disc { center: Point::new(10.0, 10.0), radius: 4.0 },
            Mark::Stroke { points: vec![Point::new(0.0, 30.0), Point::new(40.0, 30.0)], width: 6.0 },
        ];
        let mask = OccupancyMask::rasterize(50, 50, marks);
        assert!(mask.is_covered(10, 10));
        assert!(mask.is_covered(20, 30));
        assert!(!mask.is_covered(20, 10));
        assert!(!mask.is_covered(45, 45));

        let degenerate = OccupancyMask::rasterize(0, 0, Vec::new());
        assert_eq!(degenerate.covered_count(), 0);
        assert_eq!(degenerate.occupied_fraction(0.0, 0.0, 10.0, 10.0, 3), 0.0);
    }

    #[test]
    fn strokes_use_mitred_joins() {
        let marks = vec![Mark::Stroke {
            points: vec![Point::new(10.0, 40.0), Point::new(30.0, 10.0), Point::new(50.0, 40.0)],
            width: 10.0,
        }];
        let mask = OccupancyMask::rasterize(60, 60, marks);
        // the mitre reaches y = 1; a round join would stop at y = 5
        assert!(mask.is_covered(30, 3));
        assert!(!mask.is_covered(30, 0));
    }

    #[test]
    fn occupied_fraction_sampling() {
        let left_half = OccupancyMask::from_fn(100, 100, |x, _| x < 50);
        assert_eq!(left_half.occupied_fraction(0.0, 0.0, 99.0, 0.0, 1), 0.5);
        assert_eq!(left_half.occupied_fraction(0.0, 0.0, 99.0, 99.0, 3), 0.5);
        assert_eq!(left_half.occupied_fraction(60.0, 0.0, 90.0, 90.0, 3), 0.0);
        assert_eq!(left_half.occupied_fraction(-20.0, -20.0, 10.9, 10.9, 3), 1.0);
        assert_eq!(left_half.occupied_fraction(200.0, 0.0, 300.0, 10.0, 3), 0.0);

        let clear = OccupancyMask::clear(100, 100);
        assert_eq!(clear.occupied_fraction(0.0, 0.0, 99.0, 99.0, 3), 0.0);
    }

    #[test]
    fn spot_sizes_and_candidates() {
        let search = SpotSearch::default();
        assert_eq!(search.candidate_sizes(56.0), vec![56.0, 48.0, 40.0, 32.0]);

        let cell = Rect::new(0.0, 0.0, 90.0, 90.0);
        let candidates = search.candidates(&cell, 56.0);
        assert_eq!(candidates[0], (17.0, 23.0));
        assert_eq!(candidates.len(), 6);
        for (x, y) in candidates {
            assert!((8.0..=26.0).contains(&x));
            assert!((22.0..=26.0).contains(&y));
        }
    }

    #[test]
    fn spot_on_clear_square_is_centred() {
        let search = SpotSearch::default();
        let cell = Rect::new(0.0, 0.0, 90.0, 90.0);
        let mask = OccupancyMask::clear(100, 100);

        let spot = search.find_best_spot(&cell, 56.0, &mask).unwrap();
        assert_eq!((spot.x, spot.y, spot.size), (17.0, 23.0, 56.0));
        assert_eq!(spot.occupied_fraction, 0.0);
        assert!(matches!(search.decide(spot), IconDecision::Draw(_)));
    }

    #[test]
    fn spot_shrinks_away_from_connectors() {
        let search = SpotSearch::default();
        let cell = Rect::new(0.0, 0.0, 90.0, 90.0);
        let mask = OccupancyMask::from_fn(100, 100, |x, _| x < 45);

        let spot = search.find_best_spot(&cell, 56.0, &mask).unwrap();
        assert_eq!((spot.x, spot.y, spot.size), (42.0, 26.0, 40.0));
        assert!(spot.occupied_fraction <= 0.12);
    }

    #[test]
    fn best_spot_is_never_worse_than_a_candidate() {
        let search = SpotSearch::default();
        let cell = Rect::new(0.0, 0.0, 90.0, 90.0);
        let mask = OccupancyMask::from_fn(100, 100, |x, _| x % 2 == 0);
        let stride = search.config().sample_stride;

        let spot = search.find_best_spot(&cell, 56.0, &mask).unwrap();
        let mut tried = Vec::new();
        for size in search.candidate_sizes(56.0) {
            for (x, y) in search.candidates(&cell, size) {
                let fraction = mask.occupied_fraction(x, y, x + size, y + size, stride);
                assert!(spot.occupied_fraction <= fraction);
                tried.push((x, y, size, fraction));
            }
        }
        assert!(tried.contains(&(spot.x, spot.y, spot.size, spot.occupied_fraction)));
    }

    #[test]
    fn spot_on_covered_square_is_skipped() {
        let search = SpotSearch::default();
        let cell = Rect::new(0.0, 0.0, 90.0, 90.0);
        let mask = OccupancyMask::from_fn(100, 100, |_, _| true);

        let spot = search.find_best_spot(&cell, 56.0, &mask).unwrap();
        assert_eq!(spot.occupied_fraction, 1.0);
        assert_eq!(spot.size, 56.0);
        assert_eq!((spot.x, spot.y), (17.0, 23.0));

        let decision = search.place(&cell, 56.0, &mask).unwrap();
        assert!(!decision.is_draw());
        assert_eq!(decision.spot(), &spot);
    }

    #[test]
    fn builtin_bank_is_sound() {
        let bank = WordBank::builtin().unwrap();
        assert_eq!(bank.words().len(), 369);
        assert_eq!(bank.us_extras().len(), 8);
        assert!(bank.integrity_issues().is_empty());
    }

    #[test]
    fn bank_selection() {
        let bank = WordBank::builtin().unwrap();
        let filter = b_initial_closed().bank_filter();
        let picked = bank.select(&filter);
        assert!(picked.len() >= 2);
        assert!(picked.iter().all(|w| w.sound == Sound::B && w.pos == Position::Initial));
        assert!(picked.iter().any(|w| w.orth == "bus"));
        // "bear" is CVV in UK English
        assert!(!picked.iter().any(|w| w.orth == "bear"));

        let us = bank.select(&BankFilter { dialect: Dialect::US, ..filter });
        assert!(us.iter().any(|w| w.orth == "bear"));

        let finals = bank.select(&BankFilter {
            sounds: vec![Sound::P],
            position: PositionFilter::Final,
            shape_group: ShapeGroup::Any,
            ..BankFilter::default()
        });
        assert!(finals.iter().all(|w| w.pos == Position::Final));
        assert!(finals.iter().any(|w| w.orth == "lamp"));
    }

    #[test]
    fn us_english_swaps_mum_for_mom() {
        let bank = WordBank::builtin().unwrap();
        let filter = BankFilter { sounds: vec![Sound::M], shape_group: ShapeGroup::Any, ..BankFilter::default() };

        let uk = bank.select(&filter);
        assert!(uk.iter().any(|w| w.orth == "mum"));
        assert!(!uk.iter().any(|w| w.orth == "mom"));

        let us = bank.select(&BankFilter { dialect: Dialect::US, ..filter });
        assert!(!us.iter().any(|w| w.orth == "mum"));
        assert!(us.iter().any(|w| w.orth == "mom"));
    }

    #[test]
    fn icon_keys() {
        assert_eq!(emoji_hex_sequence("🐷"), "1F437");
        assert_eq!(emoji_hex_sequence("🖊️"), "1F58A-FE0F");
        assert_eq!(normalize_hex("26F5_toggle"), "26F5");
        assert_eq!(normalize_hex("1F437"), "1F437");

        let bank = WordBank::builtin().unwrap();
        let pig = bank.words().iter().find(|w| w.orth == "pig").unwrap();
        assert_eq!(pig.hex, "1F437");
    }

    #[test]
    fn icon_url_order() {
        assert_eq!(icon_urls("1f58a-fe0f", ColorMode::Color), vec![
            "https://cdn.jsdelivr.net/npm/openmoji@15.0.0/color/svg/1F58A-FE0F.svg".to_string(),
            "https://cdn.jsdelivr.net/npm/openmoji@15.0.0/color/svg/1F58A.svg".to_string(),
            "https://cdn.jsdelivr.net/gh/twitter/twemoji@14.0.2/assets/svg/1f58a.svg".to_string(),
        ]);
        assert_eq!(icon_urls("1F437", ColorMode::Bw), vec![
            "https://cdn.jsdelivr.net/npm/openmoji@15.0.0/black/svg/1F437.svg".to_string(),
            "https://cdn.jsdelivr.net/gh/twitter/twemoji@14.0.2/assets/svg/1f437.svg".to_string(),
        ]);
    }

    #[test]
    fn icon_cache_remembers_hits_and_misses() {
        let source = FakeSource::new(|url| url.to_lowercase().contains("1f47b"));
        let mut cache = IconCache::new();

        let pig = IconKey::new(ColorMode::Color, "1f437");
        assert!(cache.get_or_fetch(&pig, &source).is_some());
        assert!(cache.get_or_fetch(&IconKey::new(ColorMode::Color, "1F437"), &source).is_some());
        assert_eq!(source.call_count(), 1);

        let ghost = IconKey::new(ColorMode::Color, "1F47B");
        assert!(cache.get_or_fetch(&ghost, &source).is_none());
        assert_eq!(source.call_count(), 3);
        assert!(cache.get_or_fetch(&ghost, &source).is_none());
        assert_eq!(source.call_count(), 3);
        assert_eq!(cache.lookup(&ghost), Some(None));

        cache.reset();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup(&pig), None);
    }

    #[test]
    fn icon_cache_falls_back_to_twemoji() {
        let source = FakeSource::new(|url| url.contains("openmoji"));
        let mut cache = IconCache::new();
        let icon = cache.get_or_fetch(&IconKey::new(ColorMode::Bw, "1F58A-FE0F"), &source).unwrap();
        assert!(icon.contains("twemoji"));
        assert_eq!(source.call_count(), 3);
    }

    #[test]
    fn icon_preload_dedups() {
        let source = FakeSource::new(|_| false);
        let mut cache = IconCache::new();
        cache.preload(["1f437", "1F437", "1F41D", ""], ColorMode::Color, &source);
        assert_eq!(source.call_count(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn target_groups() {
        let visible = vec![
            word("bus", Sound::B),
            word("bat", Sound::B),
            word("bus", Sound::B),
            word("sun", Sound::S),
            word("cat", Sound::K),
            word("tap", Sound::T),
        ];
        let groups = group_targets(&visible, &[Sound::S, Sound::B]);

        let order: Vec<Sound> = groups.iter().map(|g| g.sound).collect();
        assert_eq!(order, vec![Sound::S, Sound::B, Sound::K, Sound::T]);
        assert_eq!(groups[1].words, vec!["bat".to_string(), "bus".to_string()]);
        assert_eq!(groups[0].ipa, "/s/");

        assert!(group_targets(&Vec::<WordEntry>::new(), &[Sound::S]).is_empty());
    }

    #[test]
    fn header_labels() {
        let meta = BoardMeta::new(Dialect::UK, &[Sound::B, Sound::Sh], PositionFilter::Initial, ShapeGroup::ClosedSyllables, ColorMode::Bw);
        assert_eq!(meta.sound_label, "/b/, /ʃ/");
        assert_eq!(meta.position_label, "Initial");
        assert_eq!(meta.shape_label, "CVC+CVVC");
        assert_eq!(meta.theme_label, "B/W");

        let any = BoardMeta::new(Dialect::US, &[Sound::Ng], PositionFilter::Any, ShapeGroup::Any, ColorMode::Color);
        assert_eq!(any.position_label, "Any position");
        assert_eq!(any.theme_label, "Colour");
        assert_eq!(any.sound_label, "/ŋ/");
    }

    #[test]
    fn settings_validation() {
        let deduped = BoardSettings { sounds: vec![Sound::B, Sound::B, Sound::S], ..BoardSettings::default() }
            .validate()
            .unwrap();
        assert_eq!(deduped.sounds, vec![Sound::B, Sound::S]);

        let none = BoardSettings::default().validate().unwrap_err();
        assert_eq!(none, SettingsError::NoSoundSelected);
        assert_eq!(none.to_string(), "Choose at least 1 target sound.");

        let many = BoardSettings { sounds: vec![Sound::B, Sound::S, Sound::T, Sound::K], ..BoardSettings::default() }
            .validate()
            .unwrap_err();
        assert_eq!(many, SettingsError::TooManySounds { count: 4 });
        assert_eq!(many.to_string(), "You can select up to 3 sounds per board. Try again.");
    }

    #[test]
    fn settings_from_json() {
        let settings: BoardSettings = serde_json::from_str(
            r#"{"sounds": ["b", "sh"], "position": "initial", "shape_group": "CVC+CVVC", "theme": "bw", "dialect": "us"}"#,
        ).unwrap();
        assert_eq!(settings.sounds, vec![Sound::B, Sound::Sh]);
        assert_eq!(settings.position, PositionFilter::Initial);
        assert_eq!(settings.theme, ColorMode::Bw);
        assert_eq!(settings.dialect, Dialect::US);

        let defaults: BoardSettings = serde_json::from_str(r#"{"sounds": ["k"]}"#).unwrap();
        assert_eq!(defaults.shape_group, ShapeGroup::ClosedSyllables);
        assert_eq!(defaults.position, PositionFilter::Any);
    }

    #[test]
    fn plan_common_board() {
        let generator = Generator::builtin().unwrap();
        let plan = generator.plan(&b_initial_closed(), 42).unwrap();

        assert!(plan.ok);
        assert_eq!(plan.note, None);
        assert_eq!(plan.cells.len(), 98);
        assert_eq!(plan.connectors.len(), 15);
        assert_eq!(plan.cells[0].square, sq(2));
        assert!(plan.cells.iter().all(|c| c.item.is_some() && c.decision.is_some()));

        let topology = BoardTopology::classic();
        for pair in topology.adjacent_pairs() {
            let a = &plan.cells[pair.0].item.as_ref().unwrap().orth;
            let b = &plan.cells[pair.1].item.as_ref().unwrap().orth;
            assert_ne!(a, b);
        }

        for cell in &plan.cells {
            let decision = cell.decision.unwrap();
            let spot = *decision.spot();
            assert!(spot.x >= cell.rect.x && spot.x + spot.size <= cell.rect.x + cell.rect.w);
            assert!(spot.y >= cell.rect.y && spot.y + spot.size <= cell.rect.y + cell.rect.h);
            assert_eq!(decision.is_draw(), spot.occupied_fraction <= 0.65);
        }

        assert_eq!(plan, generator.plan(&b_initial_closed(), 42).unwrap());
    }

    #[test]
    fn plan_rejects_bad_input() {
        let generator = Generator::builtin().unwrap();
        let err = generator.plan(&BoardSettings::default(), 1).unwrap_err();
        assert!(matches!(err, GenerateError::Settings(SettingsError::NoSoundSelected)));
        assert_eq!(err.user_message(), "Choose at least 1 target sound.");

        let tiny = Generator::new(WordBank::new(vec![word("bee", Sound::B)], Vec::new()));
        let settings = BoardSettings { sounds: vec![Sound::B], shape_group: ShapeGroup::Any, ..BoardSettings::default() };
        let err = tiny.plan(&settings, 1).unwrap_err();
        assert!(matches!(err, GenerateError::InsufficientTargets { found: 1 }));
        assert_eq!(err.user_message(), "Not enough targets match these filters. Try changing structure or sound position settings.");
    }

    #[test]
    fn plan_flags_best_effort_boards() {
        let repetitive = Generator::new(WordBank::new(vec![word("bee", Sound::B), word("bee", Sound::B)], Vec::new()));
        let settings = BoardSettings { sounds: vec![Sound::B], shape_group: ShapeGroup::Any, ..BoardSettings::default() };
        let plan = repetitive.plan(&settings, 9).unwrap();

        assert!(!plan.ok);
        assert_eq!(plan.attempts, 180);
        assert_eq!(plan.note.as_deref(), Some("could not satisfy adjacency (pool too small / too repetitive)"));
        assert!(plan.cells.iter().all(|c| c.item.is_some()));
    }

    #[test]
    fn fresh_seeds_vary() {
        assert!((0..8).map(|_| fresh_seed()).unique().count() > 1);
    }

    #[test]
    fn session_resolves_icons() {
        let source = FakeSource::new(|_| false);
        let mut session = Session::new(Generator::builtin().unwrap(), &source);
        let board = session.generate(&b_initial_closed(), 42).unwrap();

        let drawable = board.plan.cells.iter().filter(|c| c.decision.is_some_and(|d| d.is_draw())).count();
        assert_eq!(board.icons.len(), drawable);

        let hexes: HashSet<&str> = board.plan.cells.iter().filter_map(|c| c.item.as_ref()).map(|i| i.hex.as_str()).collect();
        assert_eq!(session.cache().len(), hexes.len());
        assert_eq!(source.call_count(), hexes.len());

        assert_eq!(board.targets.len(), 1);
        assert_eq!(board.targets[0].sound, Sound::B);
        let shown: HashSet<&str> = board.icons.iter().map(|i| i.orth.as_str()).collect();
        assert_eq!(board.targets[0].words.len(), shown.len());
        assert!(board.targets[0].words.iter().all(|w| shown.contains(w.as_str())));
    }

    #[test]
    fn session_skips_unfetchable_icons() {
        let source = FakeSource::new(|_| true);
        let mut session = Session::new(Generator::builtin().unwrap(), &source);
        let board = session.generate(&b_initial_closed(), 42).unwrap();

        assert!(board.plan.ok);
        assert!(board.icons.is_empty());
        assert!(board.targets.is_empty());
        assert!(session.cache().len() > 0);
    }

    #[test]
    fn session_starts_each_board_with_an_empty_cache() {
        let source = FakeSource::new(|_| false);
        let mut session = Session::new(Generator::builtin().unwrap(), &source);

        session.generate(&b_initial_closed(), 5).unwrap();
        let first = source.call_count();
        session.generate(&b_initial_closed(), 5).unwrap();
        assert_eq!(source.call_count(), 2 * first);
    }
}
