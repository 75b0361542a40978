use youth_chat_rust::app::App;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    youth_chat_rust::logging::init()?;
    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = App::new().await?.run(terminal).await;
    ratatui::restore();
    result
}
