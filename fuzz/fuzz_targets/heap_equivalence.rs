#![no_main]
use libfuzzer_sys::fuzz_target;

use ordered_containers::model::{run_heap_equivalence, HeapOp};

fuzz_target!(|ops: Vec<HeapOp>| { run_heap_equivalence(ops) });
