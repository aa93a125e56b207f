// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::rc::Rc;

use clap::{Parser as ClapParser, Subcommand};
use console::Style;
use vow::core::Core;
use vow::handler::StateSnapshot;
use vow::promise::Promise;
use vow::scheduler::{ManualQueue, Scheduler};
use vow::value::{MaybeThenable, ResolveFn, ThenMethod, Value};

/// A tiny driver for the vow promise core.
#[derive(Debug, ClapParser)]
#[command(name = "vow")]
#[command(about = "Builds canned promise chains and drains them to completion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fulfills 42, chains `+1`, and prints both promises' final state.
    Basic,
    /// Throws inside the resolver and prints the resulting rejection.
    Throws,
    /// Resolves a deferred with a promise that follows itself; prints the
    /// type-error rejection cycle detection produces instead of hanging.
    Cycle,
    /// Adopts a foreign thenable and prints the fulfilled value.
    Thenable,
    /// Races a never-settling promise against two already-resolved ones.
    Race,
    /// Awaits a mix of plain values and promises with `all`.
    All,
    /// Runs every demo above in sequence.
    Demo,
}

fn main() {
    let args = Cli::parse();
    match args.command.unwrap_or(Command::Demo) {
        Command::Basic => run_demo("basic", basic),
        Command::Throws => run_demo("throws", throws),
        Command::Cycle => run_demo("cycle", cycle),
        Command::Thenable => run_demo("thenable", thenable),
        Command::Race => run_demo("race", race),
        Command::All => run_demo("all", all),
        Command::Demo => {
            run_demo("basic", basic);
            run_demo("throws", throws);
            run_demo("cycle", cycle);
            run_demo("thenable", thenable);
            run_demo("race", race);
            run_demo("all", all);
        }
    }
}

fn run_demo(name: &str, f: impl FnOnce(&Core, &Rc<ManualQueue>) -> Vec<(&'static str, Promise)>) {
    let heading = Style::new().bold().cyan();
    println!("{}", heading.apply_to(format!("== {name} ==")));

    let queue = Rc::new(ManualQueue::new());
    let scheduler: Rc<dyn Scheduler> = queue.clone();
    let core = Core::new(scheduler);

    let labeled = f(&core, &queue);
    for (label, promise) in &labeled {
        println!("  {label} (before drain): {}", describe(&promise.inspect()));
    }

    ManualQueue::drain(&queue);

    for (label, promise) in &labeled {
        println!("  {label} (after drain):  {}", describe(&promise.inspect()));
    }
    println!();
}

fn describe(snapshot: &StateSnapshot) -> String {
    let pending = Style::new().dim();
    let fulfilled = Style::new().green();
    let rejected = Style::new().red();
    match snapshot {
        StateSnapshot::Pending => pending.apply_to("pending".to_string()).to_string(),
        StateSnapshot::Fulfilled(value) => fulfilled.apply_to(format!("fulfilled({value:?})")).to_string(),
        StateSnapshot::Rejected(reason) => rejected.apply_to(format!("rejected({reason:?})")).to_string(),
    }
}

/// `new Promise((res) => res(42)).then(v => v + 1)` — the chained promise
/// inspects as pending until the scheduler runs, even though the source
/// promise already settled synchronously.
fn basic(core: &Core, _queue: &Rc<ManualQueue>) -> Vec<(&'static str, Promise)> {
    let source = core.promise(|resolve, _reject, _notify| {
        resolve(Value::plain(42_i32));
        Ok(())
    });
    let chained = source.then(
        Some(Rc::new(|v: Value, _receiver: Option<&Value>| {
            Ok(Value::plain(v.downcast_ref::<i32>().copied().unwrap_or(0) + 1))
        })),
        None,
        None,
    );
    vec![("source", source), ("chained", chained)]
}

/// `new Promise(() => { throw "E" })` rejects with reason "E".
fn throws(core: &Core, _queue: &Rc<ManualQueue>) -> Vec<(&'static str, Promise)> {
    let promise = core.promise(|_resolve, _reject, _notify| Err(Value::plain("E")));
    vec![("promise", promise)]
}

/// A deferred resolved with a promise that follows itself rejects with a
/// type error rather than hanging or recursing infinitely.
fn cycle(core: &Core, _queue: &Rc<ManualQueue>) -> Vec<(&'static str, Promise)> {
    let (promise, resolve, _reject) = core.with_resolvers();
    resolve(Value::Promise(promise.clone()));
    vec![("self_resolved", promise)]
}

#[derive(Debug)]
struct DemoThenable;

struct DemoThen;

impl fmt::Debug for DemoThen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DemoThen")
    }
}

impl ThenMethod for DemoThen {
    fn call(
        &self,
        _thenable: Value,
        resolve: ResolveFn,
        _reject: vow::value::RejectFn,
        _notify: vow::value::NotifyFn,
    ) -> Result<(), Value> {
        resolve(Value::plain(7_i32));
        Ok(())
    }
}

impl MaybeThenable for DemoThenable {
    fn then(&self) -> Result<Option<Rc<dyn ThenMethod>>, Value> {
        Ok(Some(Rc::new(DemoThen)))
    }
}

/// `resolve({then: (r) => r(7)}).then(v => v)` fulfills with 7; adoption
/// happens asynchronously even though the foreign `then` calls its
/// resolver synchronously.
fn thenable(core: &Core, _queue: &Rc<ManualQueue>) -> Vec<(&'static str, Promise)> {
    let adopted = core
        .resolve(Value::object(Rc::new(DemoThenable)))
        .then(Some(Rc::new(|v: Value, _receiver: Option<&Value>| Ok(v))), None, None);
    vec![("adopted", adopted)]
}

/// `race([pendingForever, resolve("a"), resolve("b")])` fulfills with "a":
/// the first input to settle, in enqueue order, under the scheduler's
/// FIFO guarantee.
fn race(core: &Core, _queue: &Rc<ManualQueue>) -> Vec<(&'static str, Promise)> {
    let pending_forever = Value::Promise(core.empty());
    let a = Value::Promise(core.resolve(Value::plain("a")));
    let b = Value::Promise(core.resolve(Value::plain("b")));
    let raced = core.race(vec![pending_forever, a, b]);
    vec![("raced", raced)]
}

/// `all([1, resolve(2), new Promise(r => later(() => r(3)))])` fulfills
/// with `[1, 2, 3]`, preserving index order regardless of settlement
/// order.
fn all(core: &Core, queue: &Rc<ManualQueue>) -> Vec<(&'static str, Promise)> {
    let one = Value::plain(1_i32);
    let two = Value::Promise(core.resolve(Value::plain(2_i32)));
    let (slow, slow_resolve, _slow_reject) = core.with_resolvers();
    queue.enqueue(Box::new(DelayedResolve {
        resolve: slow_resolve,
        value: Value::plain(3_i32),
    }));

    let awaited = core.all(vec![one, two, Value::Promise(slow)]);
    vec![("awaited", awaited)]
}

/// A task that resolves a deferred once run, modeling work that completes
/// after a scheduler turn rather than inline (e.g. a timer in a real
/// host).
struct DelayedResolve {
    resolve: ResolveFn,
    value: Value,
}

impl vow::scheduler::Task for DelayedResolve {
    fn run(self: Box<Self>, _scheduler: Rc<dyn Scheduler>) {
        (self.resolve)(self.value);
    }
}
