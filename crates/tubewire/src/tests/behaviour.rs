//! Behaviour scenarios for dispatch through a pool of scripted servers.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::command::{Command, PutOptions};
use crate::connection::Connection;
use crate::error::{ClientError, ProtocolErrorKind};
use crate::job::{Job, JobState};
use crate::pool::{Pool, RoundRobinSelector};
use crate::test_support::{ScriptedConnector, WireHandle, endpoint};
use crate::tube::Tube;

type ScriptedPool = Pool<ScriptedConnector, RoundRobinSelector>;

/// State shared across steps.
#[derive(Default)]
struct TestWorld {
    pool: Option<ScriptedPool>,
    logs: Vec<WireHandle>,
    job: Option<Job>,
    failure: Option<ClientError>,
}

impl TestWorld {
    fn start(&mut self, servers: &str, script: &str) {
        let script = script.replace("\\r\\n", "\r\n");
        let mut connections = Vec::new();
        for name in servers.split(',') {
            let connector = ScriptedConnector::replying(&script);
            self.logs.push(connector.log());
            connections
                .push(Connection::open(endpoint(name), connector).expect("scripted connect"));
        }
        let pool = Pool::with_selector(connections, RoundRobinSelector::new()).expect("pool");
        self.pool = Some(pool);
    }

    fn pool(&self) -> &ScriptedPool {
        self.pool.as_ref().expect("pool started")
    }

    fn only_log(&self) -> &WireHandle {
        match self.logs.as_slice() {
            [log] => log,
            logs => panic!("expected one server, found {}", logs.len()),
        }
    }
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

#[given("a server \"{server}\" replying \"{script}\"")]
fn given_server(world: &RefCell<TestWorld>, server: String, script: String) {
    world.borrow_mut().start(&server, &script);
}

#[given("servers \"{servers}\" each replying \"{script}\"")]
fn given_servers(world: &RefCell<TestWorld>, servers: String, script: String) {
    world.borrow_mut().start(&servers, &script);
}

#[when("the client peeks the next ready job in tube \"{tube}\"")]
fn when_peek_ready(world: &RefCell<TestWorld>, tube: String) {
    let job = {
        let w = world.borrow();
        let handle = Tube::named(&tube, w.pool()).expect("valid tube");
        handle.peek_ready().expect("peek-ready")
    };
    world.borrow_mut().job = job;
}

#[when("the client dispatches \"{command}\" through the pool")]
fn when_dispatch(world: &RefCell<TestWorld>, command: String) {
    assert_eq!(command, "peek-ready", "only peek-ready is scripted");
    let result = world.borrow().pool().dispatch(&Command::PeekReady);
    world.borrow_mut().failure = result.err();
}

#[when("the client uses tube \"{tube}\"")]
fn when_use(world: &RefCell<TestWorld>, tube: String) {
    world.borrow().pool().use_tube(&tube).expect("use");
}

#[when("the client watches tube \"{tube}\"")]
fn when_watch(world: &RefCell<TestWorld>, tube: String) {
    world.borrow().pool().watch(&tube).expect("watch");
}

#[when("the client ignores tube \"{tube}\"")]
fn when_ignore(world: &RefCell<TestWorld>, tube: String) {
    world.borrow().pool().ignore(&tube).expect("ignore");
}

#[when("the client puts {count} jobs")]
fn when_put(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    for _ in 0..count {
        let command = Command::put(b"job".to_vec(), PutOptions::default());
        w.pool().dispatch(&command).expect("put");
    }
}

#[when("the client reserves a job")]
fn when_reserve(world: &RefCell<TestWorld>) {
    let response = world
        .borrow()
        .pool()
        .dispatch(&Command::reserve(None))
        .expect("reserve");
    let job = Job::from_response(response, JobState::Reserved).expect("a job");
    world.borrow_mut().job = Some(job);
}

#[then("job {id} is returned with body \"{body}\"")]
fn then_job_returned(world: &RefCell<TestWorld>, id: u64, body: String) {
    let w = world.borrow();
    let job = w.job.as_ref().expect("a job");
    assert_eq!(job.id(), id);
    assert_eq!(job.data(), body.as_bytes());
    assert_eq!(job.state(), JobState::Ready);
}

#[then("job {id} is reserved with body \"{body}\"")]
fn then_job_reserved(world: &RefCell<TestWorld>, id: u64, body: String) {
    let w = world.borrow();
    let job = w.job.as_ref().expect("a job");
    assert_eq!(job.id(), id);
    assert_eq!(job.data(), body.as_bytes());
    assert_eq!(job.state(), JobState::Reserved);
}

#[then("the server received \"{request}\"")]
fn then_received(world: &RefCell<TestWorld>, request: String) {
    assert_eq!(world.borrow().only_log().requests(), [request]);
}

#[then("the server received \"{requests}\" in order")]
fn then_received_in_order(world: &RefCell<TestWorld>, requests: String) {
    let expected: Vec<&str> = requests.split(',').collect();
    assert_eq!(world.borrow().only_log().requests(), expected);
}

#[then("the dispatch fails with NOT_FOUND for \"{command}\" on \"{server}\"")]
fn then_not_found(world: &RefCell<TestWorld>, command: String, server: String) {
    let w = world.borrow();
    let Some(ClientError::Protocol(error)) = w.failure.as_ref() else {
        panic!("expected a protocol failure, got {:?}", w.failure);
    };
    assert_eq!(error.kind(), ProtocolErrorKind::NotFound);
    assert_eq!(error.command(), command);
    assert_eq!(error.server(), server);
}

#[then("no server has received a request")]
fn then_nothing_sent(world: &RefCell<TestWorld>) {
    for log in &world.borrow().logs {
        assert!(log.requests().is_empty(), "unexpected {:?}", log.requests());
    }
}

#[then("every server received \"{request}\" once")]
fn then_each_once(world: &RefCell<TestWorld>, request: String) {
    for log in &world.borrow().logs {
        assert_eq!(log.count(&request), 1, "requests: {:?}", log.requests());
    }
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/dispatch.feature",
    name = "Peeking the next ready job returns its body"
)]
fn peek_ready_returns_body(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/dispatch.feature",
    name = "Peeking an empty tube reports NOT_FOUND"
)]
fn peek_empty_tube(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/dispatch.feature",
    name = "Pool members adopt the current tube lazily"
)]
fn pool_adopts_tube_lazily(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/dispatch.feature",
    name = "Reserving watches new tubes before ignoring old ones"
)]
fn reserve_watches_before_ignoring(world: RefCell<TestWorld>) {
    let _ = world;
}
