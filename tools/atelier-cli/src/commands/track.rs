//! Carrier tracking links.

use anyhow::{bail, Result};
use atelier_commerce::orders::{Carrier, Tracking};

use super::TrackUrlArgs;
use crate::context::Context;

/// Run the track-url command.
pub async fn run(args: TrackUrlArgs, ctx: &Context) -> Result<()> {
    let Some(carrier) = Carrier::from_name(&args.carrier) else {
        let known: Vec<&str> = Carrier::ALL.iter().map(|c| c.name()).collect();
        bail!("Unknown carrier '{}'. Known carriers: {}", args.carrier, known.join(", "));
    };

    let tracking = Tracking::new(&args.number, Some(carrier), args.url.as_deref());

    if ctx.output.is_json() {
        ctx.output.json(&tracking);
        return Ok(());
    }

    match &tracking.url {
        Some(url) => println!("{}", url),
        None if carrier == Carrier::Other => {
            bail!("Carrier 'Other' has no tracking page; pass --url")
        }
        None => bail!("A tracking number is required"),
    }

    Ok(())
}
