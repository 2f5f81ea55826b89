use strand_core::scheduler::step_duration;
use strand_core::{classify, evaluate, parse, schedule, Instrument, ParseError, Pattern};

#[test]
fn test_parse_then_classify() {
    let pattern = parse("bd sn hh").unwrap();
    assert_eq!(pattern.elements, vec!["bd", "sn", "hh"]);

    let instruments: Vec<Instrument> = pattern.elements.iter().map(|e| classify(e)).collect();
    assert_eq!(
        instruments,
        vec![Instrument::Kick, Instrument::Snare, Instrument::HiHat]
    );
}

#[test]
fn test_named_pattern_with_tempo() {
    let pattern = parse("d1 $ sound \"bd sn\" bpm 90").unwrap();
    assert_eq!(pattern.name, "d1");
    assert_eq!(pattern.tempo_bpm, 90);
    assert_eq!(pattern.elements, vec!["bd", "sn"]);
}

#[test]
fn test_empty_pattern_is_rejected() {
    assert_eq!(parse(""), Err(ParseError::EmptyInput));
}

#[test]
fn test_classifier_edges() {
    assert_eq!(classify("c#4"), Instrument::Synth);
    assert_eq!(classify("xyz"), Instrument::Sample);
}

#[test]
fn test_rest_only_pattern_succeeds_without_events() {
    let result = evaluate("~ ~ ~");
    assert!(result.success);
    assert!(result.events.is_empty());
    assert!(result.error.is_none());
}

#[test]
fn test_offsets_form_arithmetic_sequence() {
    let bpms = [1, 20, 60, 90, 120, 133, 400, 1000];
    let element_sets: [&[&str]; 4] = [
        &["bd"],
        &["bd", "sn", "hh", "c4", "e4"],
        &["bd", "bd", "bd", "bd", "bd", "bd", "bd"],
        &["a", "b", "c", "d", "e", "f", "g", "a4", "b4", "c5", "d5"],
    ];

    for bpm in bpms {
        for elements in element_sets {
            let pattern = Pattern::new("p", "")
                .with_tempo(bpm)
                .with_elements(elements.iter().copied());
            let events = schedule(&pattern);
            let n = elements.len() as f64;
            let expected_step = 60.0 / (bpm as f64 * n);

            assert_eq!(events.len(), elements.len());
            assert!((step_duration(&pattern) - expected_step).abs() < 1e-12);
            for (i, event) in events.iter().enumerate() {
                let expected = i as f64 * expected_step;
                assert!(
                    (event.offset_seconds - expected).abs() < 1e-9,
                    "bpm {} event {}: {} != {}",
                    bpm,
                    i,
                    event.offset_seconds,
                    expected
                );
            }
            for pair in events.windows(2) {
                assert!(pair[1].offset_seconds > pair[0].offset_seconds);
            }
        }
    }
}

#[test]
fn test_rests_reduce_event_count_but_not_spacing() {
    let pattern = parse("\"bd ~ ~ sn ~ hh\" bpm 100").unwrap();
    let events = schedule(&pattern);
    let step = 60.0 / (100.0 * 6.0);

    assert_eq!(events.len(), 3);
    assert!(events.len() <= pattern.len());
    assert!((events[1].offset_seconds - 3.0 * step).abs() < 1e-12);
    assert!((events[2].offset_seconds - 5.0 * step).abs() < 1e-12);
}
