#[macro_use]
extern crate diesel_migrations;

use actix_web::{middleware, web, App, HttpServer};
use diesel::{
  r2d2::{ConnectionManager, Pool},
  PgConnection,
};
use yatube_server::{
  blocking,
  routes::{auth, not_found, pages},
  settings::Settings,
  YatubeError,
};

embed_migrations!();

#[actix_rt::main]
async fn main() -> Result<(), YatubeError> {
  env_logger::init();
  let settings = Settings::get();

  // Set up the r2d2 connection pool
  let db_url = settings.get_database_url();
  let manager = ConnectionManager::<PgConnection>::new(&db_url);
  let pool = Pool::builder()
    .max_size(settings.database.pool_size)
    .build(manager)
    .unwrap_or_else(|_| panic!("Error connecting to {}", db_url));

  // Run the migrations from code
  blocking(&pool, move |conn| embedded_migrations::run(conn)).await??;

  println!(
    "Starting http server at {}:{}",
    settings.bind, settings.port
  );

  HttpServer::new(move || {
    App::new()
      .wrap(middleware::Logger::default())
      .data(pool.clone())
      // The routes
      .configure(pages::config)
      .configure(auth::config)
      .default_service(web::route().to(not_found))
  })
  .bind((settings.bind, settings.port))?
  .run()
  .await?;

  Ok(())
}
