use volumio_http::{BrowseOptions, Switch, Volume, VolumioClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let volumio = VolumioClient::from_env()?;

    println!("ping: {}", volumio.ping().await?);

    let state = volumio.get_state().await?;
    println!(
        "{} - {} ({})",
        state["artist"].as_str().unwrap_or("?"),
        state["title"].as_str().unwrap_or("?"),
        state["status"].as_str().unwrap_or("?"),
    );

    volumio.set_volume(Volume::level(35)?).await?;
    volumio.repeat(Switch::Off).await?;

    let root = volumio.browse(BrowseOptions::default()).await?;
    println!("{root:#}");

    Ok(())
}
