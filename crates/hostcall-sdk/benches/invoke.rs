use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hostcall_sdk::{Argument, CallPrimitive, Invoker, InvokerConfig, RoutineId};

struct Sink {
    acc: u64,
    result: u64,
}

unsafe impl CallPrimitive for Sink {
    fn begin_call(&mut self, routine: RoutineId) {
        self.acc = routine.raw();
    }

    fn push_word(&mut self, word: u64) {
        self.acc = self.acc.wrapping_add(word);
    }

    fn execute_call(&mut self) -> *const u64 {
        self.result = self.acc;
        &self.result
    }
}

fn bench_arity(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoke_arity");
    let mut invoker = Invoker::new(Sink { acc: 0, result: 0 }, InvokerConfig::default());

    for arity in [0usize, 4, 24] {
        let args: Vec<Argument> = (0..arity as i32).map(Argument::from).collect();
        group.bench_with_input(BenchmarkId::new("typed_u64", arity), &args, |b, args| {
            b.iter(|| {
                let value: u64 = invoker.invoke_as(RoutineId::new(black_box(0x1234)), args);
                value
            });
        });
    }

    group.finish();
}

fn bench_mixed(c: &mut Criterion) {
    let mut invoker = Invoker::new(Sink { acc: 0, result: 0 }, InvokerConfig::default());

    c.bench_function("invoke_mixed_args", |b| {
        b.iter(|| {
            let args = [
                Argument::from(black_box(5i32)),
                Argument::from(true),
                Argument::from(1.5f32),
                Argument::Handle(black_box(0x10)),
            ];
            invoker.invoke(RoutineId::new(0xBEEF), &args);
        });
    });
}

criterion_group!(benches, bench_arity, bench_mixed);
criterion_main!(benches);
