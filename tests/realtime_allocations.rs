use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use specmorph::{EngineConfig, MagnitudeStrategy, MorphProcessor, MorphSettings, PhaseStrategy};

struct CountingAllocator;

static TRACK_ALLOCATIONS: AtomicBool = AtomicBool::new(false);
static ALLOC_CALLS: AtomicUsize = AtomicUsize::new(0);
static ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);
static REALLOC_CALLS: AtomicUsize = AtomicUsize::new(0);
static REALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL_ALLOCATOR: CountingAllocator = CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if TRACK_ALLOCATIONS.load(Ordering::Relaxed) {
            ALLOC_CALLS.fetch_add(1, Ordering::Relaxed);
            ALLOC_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if TRACK_ALLOCATIONS.load(Ordering::Relaxed) {
            ALLOC_CALLS.fetch_add(1, Ordering::Relaxed);
            ALLOC_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let out = unsafe { System.realloc(ptr, layout, new_size) };
        if TRACK_ALLOCATIONS.load(Ordering::Relaxed) {
            REALLOC_CALLS.fetch_add(1, Ordering::Relaxed);
            REALLOC_BYTES.fetch_add(new_size, Ordering::Relaxed);
        }
        out
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

fn reset_alloc_counters() {
    ALLOC_CALLS.store(0, Ordering::Relaxed);
    ALLOC_BYTES.store(0, Ordering::Relaxed);
    REALLOC_CALLS.store(0, Ordering::Relaxed);
    REALLOC_BYTES.store(0, Ordering::Relaxed);
}

fn begin_alloc_tracking() {
    reset_alloc_counters();
    TRACK_ALLOCATIONS.store(true, Ordering::SeqCst);
}

fn end_alloc_tracking() -> (usize, usize, usize, usize) {
    TRACK_ALLOCATIONS.store(false, Ordering::SeqCst);
    (
        ALLOC_CALLS.load(Ordering::Relaxed),
        REALLOC_CALLS.load(Ordering::Relaxed),
        ALLOC_BYTES.load(Ordering::Relaxed),
        REALLOC_BYTES.load(Ordering::Relaxed),
    )
}

fn test_block(frames: usize, freq: f32, offset: usize, sample_rate: f32) -> Vec<f32> {
    (0..frames)
        .map(|n| {
            let t = (n + offset) as f32 / sample_rate;
            (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect()
}

#[test]
fn process_block_steady_state_never_allocates() {
    const SAMPLE_RATE: u32 = 44_100;
    const BLOCK_FRAMES: usize = 256;
    const WARMUP_ITERS: usize = 8;
    const MEASURE_ITERS: usize = 96;

    let mut processor = MorphProcessor::new(EngineConfig::default())
        .expect("default config should be valid");
    processor.prepare(SAMPLE_RATE, BLOCK_FRAMES);

    let main = test_block(BLOCK_FRAMES, 95.0, 0, SAMPLE_RATE as f32);
    let aux = test_block(BLOCK_FRAMES, 142.0, 17, SAMPLE_RATE as f32);
    let mut block = main.clone();
    let mut out = vec![0.0f32; BLOCK_FRAMES];

    // Every strategy pair, so no dispatch arm hides an allocation.
    let mut settings = Vec::new();
    for mag in MagnitudeStrategy::ALL {
        for phase in PhaseStrategy::ALL {
            let invert = settings.len() % 2 == 1;
            settings.push(
                MorphSettings::default()
                    .with_magnitude(mag)
                    .with_phase(phase)
                    .with_invert_phase(invert),
            );
        }
    }
    settings.push(MorphSettings::default().with_bypass(true));

    for i in 0..WARMUP_ITERS {
        processor.process_block(&mut block, &aux, &settings[i % settings.len()]);
    }

    begin_alloc_tracking();
    for i in 0..MEASURE_ITERS {
        let s = &settings[i % settings.len()];
        block.copy_from_slice(&main);
        processor.process_block(&mut block, &aux, s);
        processor.process_block_into(&main, &aux, &mut out, s);
    }
    processor.reset();
    let (alloc_calls, realloc_calls, alloc_bytes, realloc_bytes) = end_alloc_tracking();

    assert_eq!(
        alloc_calls + realloc_calls,
        0,
        "steady-state process_block allocated: alloc_calls={}, realloc_calls={}, alloc_bytes={}, realloc_bytes={}",
        alloc_calls,
        realloc_calls,
        alloc_bytes,
        realloc_bytes
    );
    assert!(out.iter().all(|x| x.is_finite()));
}
