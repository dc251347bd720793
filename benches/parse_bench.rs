use std::alloc::{GlobalAlloc, Layout, System};
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use htmlpdf::dom;
use htmlpdf::{normalize_html, Alignment, Canvas, HtmlParser, Style};

#[derive(Clone)]
struct Fixture {
    key: &'static str,
    html: String,
}

const WARMUP_ITERS: usize = 3;
const MEASURE_ITERS: usize = 25;

struct TrackingAllocator;

static CURRENT_ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL_ALLOCATOR: TrackingAllocator = TrackingAllocator;

fn current_alloc_bytes() -> usize {
    CURRENT_ALLOC_BYTES.load(Ordering::Relaxed)
}

fn peak_alloc_bytes() -> usize {
    PEAK_ALLOC_BYTES.load(Ordering::Relaxed)
}

fn reset_peak_alloc_bytes() {
    PEAK_ALLOC_BYTES.store(current_alloc_bytes(), Ordering::Relaxed);
}

fn add_current_alloc_bytes(delta: usize) {
    let current = CURRENT_ALLOC_BYTES.fetch_add(delta, Ordering::Relaxed) + delta;
    PEAK_ALLOC_BYTES.fetch_max(current, Ordering::Relaxed);
}

fn sub_current_alloc_bytes(delta: usize) {
    let _ = CURRENT_ALLOC_BYTES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_sub(delta))
    });
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            add_current_alloc_bytes(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        sub_current_alloc_bytes(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                add_current_alloc_bytes(new_size - layout.size());
            } else {
                sub_current_alloc_bytes(layout.size() - new_size);
            }
        }
        new_ptr
    }
}

/// Canvas that only counts calls, so the traversal is measured on its own.
#[derive(Default)]
struct CountingCanvas {
    calls: usize,
    left: f32,
    right: f32,
    y: f32,
    size: f32,
}

impl Canvas for CountingCanvas {
    fn left_margin(&self) -> f32 {
        self.left
    }
    fn set_left_margin(&mut self, margin: f32) {
        self.calls += 1;
        self.left = margin;
    }
    fn right_margin(&self) -> f32 {
        self.right
    }
    fn set_right_margin(&mut self, margin: f32) {
        self.calls += 1;
        self.right = margin;
    }
    fn y(&self) -> f32 {
        self.y
    }
    fn set_y(&mut self, y: f32) {
        self.calls += 1;
        self.y = y;
    }
    fn font_size(&self) -> f32 {
        self.size
    }
    fn string_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.size * 0.5
    }
    fn apply_style(&mut self, style: &Style) {
        self.calls += 1;
        self.size = style.font.size;
    }
    fn write(&mut self, height: f32, _text: &str) {
        self.calls += 1;
        self.y += height;
    }
    fn multi_cell(&mut self, _width: f32, height: f32, _text: &str, _align: Alignment) {
        self.calls += 1;
        self.y += height;
    }
    fn cell(&mut self, _width: f32, _height: f32, _text: &str, _border: bool, _align: Alignment) {
        self.calls += 1;
    }
    fn line_break(&mut self, height: Option<f32>) {
        self.calls += 1;
        self.y += height.unwrap_or(self.size);
    }
    fn add_page(&mut self) {
        self.calls += 1;
        self.y = 0.0;
    }
}

fn quote_document(lines: usize) -> String {
    let mut html = String::from("<html><body>\n<h1 class=\"text-center\">Quote</h1>\n");
    html.push_str("<p class=\"mb-3\">Prepared for <b>ACME Corp</b>, valid 30 days.</p>\n<ol>\n");
    for i in 0..lines {
        html.push_str(&format!(
            "  <li class=\"mt-1\">Item {} <i>(qty {})</i> <span style=\"color:#d9534f\">{}.00</span></li>\n",
            i + 1,
            i % 7 + 1,
            (i * 37) % 500
        ));
    }
    html.push_str("</ol>\n<p class=\"page-break\"></p>\n<ul type=\"a\">\n");
    for i in 0..lines / 4 {
        html.push_str(&format!(
            "  <li>Term {} <code>T-{}</code><ol type=\"i\"><li>detail</li></ol></li>\n",
            i + 1,
            i
        ));
    }
    html.push_str("</ul>\n<p class=\"text-justify text-muted\">Thank you for your business.<br>Regards</p>\n");
    html.push_str("</body></html>\n");
    html
}

fn malformed_document(paragraphs: usize) -> String {
    let mut html = String::from("<body>");
    for i in 0..paragraphs {
        html.push_str(&format!(
            "<p class=text-danger>unclosed <b>bold {} &amp; <i>italic &nbsp;</p></span>",
            i
        ));
    }
    html
}

fn fixtures() -> Vec<Fixture> {
    vec![
        Fixture {
            key: "quote-small",
            html: quote_document(10),
        },
        Fixture {
            key: "quote-large",
            html: quote_document(400),
        },
        Fixture {
            key: "malformed",
            html: malformed_document(200),
        },
    ]
}

#[derive(Clone, Debug)]
struct CaseResult {
    fixture: String,
    case: String,
    iterations: usize,
    min: u128,
    median: u128,
    p90: u128,
    mean: u128,
    max: u128,
    median_peak_heap_bytes: usize,
}

fn percentile<T: Copy>(sorted: &[T], percentile: f64) -> T {
    let idx = ((sorted.len().saturating_sub(1) as f64) * percentile).round() as usize;
    sorted[idx]
}

fn run_case<F>(fixture: &str, case: &str, mut op: F) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..WARMUP_ITERS {
        black_box(op());
    }

    let mut samples = Vec::with_capacity(MEASURE_ITERS);
    let mut mem_samples = Vec::with_capacity(MEASURE_ITERS);
    for _ in 0..MEASURE_ITERS {
        let baseline_alloc = current_alloc_bytes();
        reset_peak_alloc_bytes();
        let start = Instant::now();
        black_box(op());
        samples.push(start.elapsed().as_nanos());
        mem_samples.push(peak_alloc_bytes().saturating_sub(baseline_alloc));
    }

    samples.sort_unstable();
    mem_samples.sort_unstable();
    let sum: u128 = samples.iter().copied().sum();

    CaseResult {
        fixture: fixture.to_string(),
        case: case.to_string(),
        iterations: MEASURE_ITERS,
        min: samples[0],
        median: percentile(&samples, 0.5),
        p90: percentile(&samples, 0.9),
        mean: sum / samples.len() as u128,
        max: samples[samples.len() - 1],
        median_peak_heap_bytes: percentile(&mem_samples, 0.5),
    }
}

fn main() {
    let fixtures = fixtures();
    println!("# htmlpdf benchmark corpus");
    println!(
        "# warmup_iters={}, measure_iters={}",
        WARMUP_ITERS, MEASURE_ITERS
    );
    println!("# fixture_count={}", fixtures.len());
    println!("fixture,case,iterations,min_ns,median_ns,p90_ns,mean_ns,max_ns,median_peak_heap_bytes");

    let parser = HtmlParser::new();
    let mut results: Vec<CaseResult> = Vec::new();

    for fixture in &fixtures {
        let html = fixture.html.as_str();
        let max_depth = parser.options().max_depth;

        results.push(run_case(fixture.key, "normalize", || {
            black_box(normalize_html(html).len())
        }));

        results.push(run_case(fixture.key, "dom/load", || {
            let doc = dom::load(&normalize_html(html), max_depth).expect("load failed");
            black_box(doc.root.children.len())
        }));

        results.push(run_case(fixture.key, "parse", || {
            let tree = parser.parse(html).expect("parse failed");
            black_box(tree.len())
        }));

        let tree = parser.parse(html).expect("parse failed");
        results.push(run_case(fixture.key, "output/counting_canvas", || {
            let mut canvas = CountingCanvas {
                right: 28.0,
                left: 28.0,
                ..CountingCanvas::default()
            };
            tree.output(&mut canvas);
            black_box(canvas.calls)
        }));

        results.push(run_case(fixture.key, "parse_and_output", || {
            let tree = parser.parse(html).expect("parse failed");
            let mut canvas = CountingCanvas::default();
            tree.output(&mut canvas);
            black_box(canvas.calls)
        }));
    }

    for result in &results {
        println!(
            "{},{},{},{},{},{},{},{},{}",
            result.fixture,
            result.case,
            result.iterations,
            result.min,
            result.median,
            result.p90,
            result.mean,
            result.max,
            result.median_peak_heap_bytes
        );
    }

    println!("# fixtures");
    println!("key,size_bytes");
    for fixture in &fixtures {
        println!("{},{}", fixture.key, fixture.html.len());
    }
}
