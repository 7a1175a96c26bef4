#![no_main]
use libfuzzer_sys::fuzz_target;

use ordered_containers::model::{run_avl_equivalence, TreeOp};

fuzz_target!(|ops: Vec<TreeOp>| { run_avl_equivalence(ops) });
