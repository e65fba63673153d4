use courier::logging::{self, info};
use courier::{ActorConfig, MonitorTag, ThreadPort, ThreadRuntime, WorkResult};

/// A ping carrying the port the reply should go to.
struct Ping {
    round: u32,
    reply_to: ThreadPort,
}

fn main() -> anyhow::Result<()> {
    logging::init_development();

    let runtime = ThreadRuntime::default();
    let pong = runtime.spawn_with(ActorConfig::named("pong"), (), |ctx, ()| -> WorkResult<u32> {
        let mut served = 0;
        while let Ok(ping) = ctx.receive_as::<Ping>() {
            ping.reply_to.send(ping.round + 1)?;
            served += 1;
        }
        Ok(served)
    })?;

    let monitor = runtime.port();
    pong.monitor(&monitor);

    let replies = runtime.port();
    let mut round = 0;
    for _ in 0..5 {
        pong.send(Ping {
            round,
            reply_to: replies.clone(),
        })?;
        round = replies.receive_as::<u32>()?;
        info!(round, "pong replied");
    }

    pong.close_incoming();
    let served = pong.value_as::<u32>()?;
    let tag = monitor.receive_as::<MonitorTag>()?;
    info!(served, %tag, live = runtime.live_actor_count(), "pong finished");

    runtime.shutdown()?;
    Ok(())
}
