use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use presswork::markup::MarkupInterpreter;
use presswork::pagesize::{self, PageOrientation};
use presswork::{Error, FontMetrics, LayoutEngine, Margins, PageSink, Pt, Rect};

/// Deterministic metrics: every character advances by half the font size
struct FixedMetrics;

impl FontMetrics for FixedMetrics {
    fn measure(&self, text: &str, size: Pt) -> Result<Pt, Error> {
        Ok(Pt(text.chars().count() as f32 * size.0 / 2.0))
    }

    fn descent(&self, _size: Pt) -> Pt {
        Pt(0.0)
    }
}

/// Counts measure calls on top of [FixedMetrics]
struct CountingMetrics {
    calls: Rc<RefCell<usize>>,
}

impl FontMetrics for CountingMetrics {
    fn measure(&self, text: &str, size: Pt) -> Result<Pt, Error> {
        *self.calls.borrow_mut() += 1;
        FixedMetrics.measure(text, size)
    }

    fn descent(&self, size: Pt) -> Pt {
        FixedMetrics.descent(size)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    OpenPage { size: (Pt, Pt), font_size: Pt },
    SetFontSize(Pt),
    Place { text: String, x: Pt, y: Pt },
    Rect(Rect),
    Line { from: (Pt, Pt), to: (Pt, Pt) },
    ClosePage,
}

/// Records every sink call for assertions; writes nothing on finish
struct RecordingSink {
    events: Rc<RefCell<Vec<Event>>>,
}

impl PageSink for RecordingSink {
    fn open_page(&mut self, size: (Pt, Pt), font_size: Pt) {
        self.events
            .borrow_mut()
            .push(Event::OpenPage { size, font_size });
    }

    fn set_font_size(&mut self, size: Pt) {
        self.events.borrow_mut().push(Event::SetFontSize(size));
    }

    fn place(&mut self, text: &str, x: Pt, y: Pt) {
        self.events.borrow_mut().push(Event::Place {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.events.borrow_mut().push(Event::Rect(rect));
    }

    fn stroke_line(&mut self, from: (Pt, Pt), to: (Pt, Pt)) {
        self.events.borrow_mut().push(Event::Line { from, to });
    }

    fn close_page(&mut self) {
        self.events.borrow_mut().push(Event::ClosePage);
    }

    fn finish(self, _out: &mut dyn Write) -> Result<(), Error> {
        Ok(())
    }
}

/// A 200 x 1000 pt page with 10 pt margins, 10 pt font (5 pt per character)
/// and no extra line spacing: 180 pt of content width, 36 characters per line
fn test_engine<M: FontMetrics>(
    metrics: M,
    events: &Rc<RefCell<Vec<Event>>>,
) -> LayoutEngine<M, RecordingSink> {
    let sink = RecordingSink {
        events: events.clone(),
    };
    let mut engine = LayoutEngine::new(metrics, sink);
    engine.set_page_size((Pt(200.0), Pt(1000.0)));
    engine.set_margins(Margins::all(Pt(10.0)));
    engine.set_font_size(Pt(10.0));
    engine.set_line_space(Pt(0.0));
    engine
}

fn places(events: &[Event]) -> Vec<(String, Pt, Pt)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Place { text, x, y } => Some((text.clone(), *x, *y)),
            _ => None,
        })
        .collect()
}

#[test]
fn wrapped_fragments_fit_and_concatenate_to_the_input() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    let input: String = "a".repeat(100);
    engine.print(&input).unwrap();

    let placed = places(&events.borrow());
    assert_eq!(placed.len(), 3);
    for (text, _, _) in placed.iter() {
        let width = FixedMetrics.measure(text, Pt(10.0)).unwrap();
        assert!(width <= Pt(180.0), "fragment {:?} overflows", text);
    }
    assert_eq!(placed[0].0.chars().count(), 36);
    assert_eq!(placed[1].0.chars().count(), 36);
    assert_eq!(placed[2].0.chars().count(), 28);

    let rejoined: String = placed.into_iter().map(|(text, _, _)| text).collect();
    assert_eq!(rejoined, input);
}

#[test]
fn wrap_probe_measures_logarithmically() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let calls = Rc::new(RefCell::new(0));
    let mut engine = test_engine(
        CountingMetrics {
            calls: calls.clone(),
        },
        &events,
    );

    let chars = 1000;
    engine.print(&"x".repeat(chars)).unwrap();

    let measured = *calls.borrow();
    assert!(
        measured < chars / 2,
        "expected far fewer than {} measure calls, got {}",
        chars / 2,
        measured
    );
}

#[test]
fn over_wide_characters_are_force_placed_one_per_line() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);
    // 200 pt per character against 180 pt of content width
    engine.set_font_size(Pt(400.0));

    engine.print("ab").unwrap();

    let placed = places(&events.borrow());
    let rejoined: String = placed.iter().map(|(text, _, _)| text.clone()).collect();
    assert_eq!(rejoined, "ab");
    for (text, x, _) in placed.iter() {
        assert_eq!(text.chars().count(), 1);
        assert_eq!(*x, Pt(10.0));
    }
}

#[test]
fn centered_text_is_offset_around_the_remaining_midpoint() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    // fresh line: available = 180, measured = 20, offset = 80
    engine.print_center("abcd").unwrap();
    assert_eq!(places(&events.borrow())[0].1, Pt(90.0));

    engine.new_line().unwrap();
    // mid-line: cursor at 20 after "aa", remaining = 170,
    // available = min(180, 340) = 180, offset = 80
    engine.print("aa").unwrap();
    engine.print_center("abcd").unwrap();
    let placed = places(&events.borrow());
    assert_eq!(placed[2].0, "abcd");
    assert_eq!(placed[2].1, Pt(100.0));
}

#[test]
fn right_aligned_text_ends_at_the_right_margin() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    engine.print_right("abcd").unwrap();

    let placed = places(&events.borrow());
    // x + measured = 170 + 20 = 190 = page width - right margin
    assert_eq!(placed[0].1, Pt(170.0));
}

#[test]
fn page_breaks_when_the_next_line_crosses_the_bottom_margin() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);
    // 200 x 100 page: lines at y = 10..=80 fit, the 9th line breaks
    engine.set_page_size((Pt(200.0), Pt(100.0)));

    for _ in 0..9 {
        engine.print("x").unwrap();
        engine.new_line().unwrap();
    }

    let events = events.borrow();
    let closes = events
        .iter()
        .filter(|e| matches!(e, Event::ClosePage))
        .count();
    assert_eq!(closes, 1);

    let placed = places(&events);
    assert_eq!(placed.len(), 9);
    // baseline = 100 - y - 10; the 8th line sits exactly on the margin
    assert_eq!(placed[0].2, Pt(80.0));
    assert_eq!(placed[7].2, Pt(10.0));
    // the 9th line opens a new page back at the top
    assert_eq!(placed[8].2, Pt(80.0));
}

#[test]
fn rendering_the_same_markup_twice_gives_identical_placements() {
    let markup = ":center:120% Title\nsome body text that wraps around the page edge\n:right by me\n";

    let run = || {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut engine = test_engine(FixedMetrics, &events);
        MarkupInterpreter::new(&mut engine).render(markup).unwrap();
        engine.new_page();
        let collected = events.borrow().clone();
        collected
    };

    assert_eq!(run(), run());
}

#[test]
fn styled_line_scales_the_font_for_one_line_only() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine)
        .render(":center:120% Title\nbody\n")
        .unwrap();

    let events = events.borrow();
    // the first page opens at the scaled size
    assert_eq!(
        events[0],
        Event::OpenPage {
            size: (Pt(200.0), Pt(1000.0)),
            font_size: Pt(12.0),
        }
    );
    // "Title" is 5 chars at 6 pt each: offset = (180 - 30) / 2 = 75
    let placed = places(&events);
    assert_eq!(placed[0], ("Title".to_string(), Pt(85.0), Pt(978.0)));
    // the size is restored before the body line
    assert!(events.contains(&Event::SetFontSize(Pt(10.0))));
    assert_eq!(placed[1].0, "body");
}

#[test]
fn page_directive_applies_to_the_next_opened_page() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine)
        .render(":::page-a3-h\nhello\n")
        .unwrap();

    let events = events.borrow();
    assert_eq!(
        events[0],
        Event::OpenPage {
            size: pagesize::A3.landscape(),
            font_size: Pt(10.0),
        }
    );
}

#[test]
fn directive_lines_ignore_trailing_text() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine)
        .render(":::page-a4 title page setup\nhello\n")
        .unwrap();

    let events = events.borrow();
    assert_eq!(
        events[0],
        Event::OpenPage {
            size: pagesize::A4,
            font_size: Pt(10.0),
        }
    );
}

#[test]
fn any_modifier_starting_with_h_requests_landscape() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine)
        .render(":::page-a3-horizontal\nx\n")
        .unwrap();

    let events = events.borrow();
    assert_eq!(
        events[0],
        Event::OpenPage {
            size: pagesize::A3.landscape(),
            font_size: Pt(10.0),
        }
    );
}

#[test]
fn a_spaceless_styled_line_is_plain_content() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine).render(":center\n").unwrap();

    let placed = places(&events.borrow());
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].0, "center");
    assert_eq!(placed[0].1, Pt(10.0));
}

#[test]
fn a_run_of_spaces_separates_style_from_content() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine)
        .render(":center  foo\n")
        .unwrap();

    let placed = places(&events.borrow());
    assert_eq!(placed[0].0, "foo");
}

#[test]
fn margin_directives_set_sides_and_all() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine)
        .render(":::margin-tb-20\n")
        .unwrap();
    assert_eq!(
        engine.margins(),
        Margins::trbl(Pt(20.0), Pt(10.0), Pt(20.0), Pt(10.0))
    );

    MarkupInterpreter::new(&mut engine)
        .render(":::margin-25\n")
        .unwrap();
    assert_eq!(engine.margins(), Margins::all(Pt(25.0)));

    // several clauses on one line, letters in either case
    MarkupInterpreter::new(&mut engine)
        .render(":::margin-T-20:margin-B-15\n")
        .unwrap();
    assert_eq!(
        engine.margins(),
        Margins::trbl(Pt(20.0), Pt(25.0), Pt(15.0), Pt(25.0))
    );
}

#[test]
fn a_title_page_lays_out_center_right_and_left_lines() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine)
        .render(":center:120% title\n:right date\ncontents\n")
        .unwrap();

    let events = events.borrow();
    let placed = places(&events);
    assert_eq!(placed.len(), 3);

    // "title" centered at 12 pt: (180 - 30) / 2 = 75 from the left margin
    assert_eq!(placed[0], ("title".to_string(), Pt(85.0), Pt(978.0)));
    // "date" right-aligned at the restored 10 pt: 190 - 20 = 170
    assert_eq!(placed[1], ("date".to_string(), Pt(170.0), Pt(968.0)));
    // "contents" flush left on the third line
    assert_eq!(placed[2], ("contents".to_string(), Pt(10.0), Pt(958.0)));

    // everything fit on a single page
    assert!(!events.contains(&Event::ClosePage));
}

#[test]
fn unknown_page_size_fails_the_document() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    let result = MarkupInterpreter::new(&mut engine).render(":::page-b5\nx\n");
    assert!(matches!(result, Err(Error::UnknownPageSize(name)) if name == "b5"));
}

#[test]
fn block_bodies_render_until_the_terminator() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine)
        .render("::header\nfirst\n:center mid\n::\nafter\n")
        .unwrap();

    let placed = places(&events.borrow());
    let texts: Vec<&str> = placed.iter().map(|(text, _, _)| text.as_str()).collect();
    assert_eq!(texts, vec!["first", "mid", "after"]);
}

#[test]
fn block_bodies_are_style_parsed_without_a_leading_colon() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    // the block kind is the first token of the opening line
    MarkupInterpreter::new(&mut engine)
        .render("::header page top\ncenter mid\n::\n")
        .unwrap();

    let placed = places(&events.borrow());
    assert_eq!(placed.len(), 1);
    // "mid" is 3 chars at 5 pt each: offset = (180 - 15) / 2 = 82.5
    assert_eq!(placed[0], ("mid".to_string(), Pt(92.5), Pt(980.0)));
}

#[test]
fn a_left_prefix_escapes_a_leading_colon() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    MarkupInterpreter::new(&mut engine)
        .render(":left :foo\n")
        .unwrap();

    let placed = places(&events.borrow());
    assert_eq!(placed[0].0, ":foo");
}

#[test]
fn embedded_newlines_break_lines_inside_one_print() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);

    engine.print("one\r\ntwo").unwrap();

    let placed = places(&events.borrow());
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].0, "one");
    assert_eq!(placed[1].0, "two");
    assert!(placed[1].2 < placed[0].2, "second line is lower on the page");
}

#[test]
fn finishing_without_placements_emits_no_pages() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let engine = test_engine(FixedMetrics, &events);

    let mut out: Vec<u8> = Vec::new();
    engine.finish(&mut out).unwrap();

    assert!(events.borrow().is_empty());
}

#[test]
fn margin_box_and_debug_marks_are_stroked_on_close() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = test_engine(FixedMetrics, &events);
    engine.set_draw_margin_box(true);
    engine.set_draw_debug_marks(true);

    engine.print("hi").unwrap();
    engine.new_page();

    let events = events.borrow();
    assert!(events.contains(&Event::Rect(Rect {
        x1: Pt(10.0),
        y1: Pt(10.0),
        x2: Pt(190.0),
        y2: Pt(990.0),
    })));
    assert!(events.contains(&Event::Line {
        from: (Pt(10.0), Pt(990.0)),
        to: (Pt(10.0), Pt(1000.0)),
    }));
}
