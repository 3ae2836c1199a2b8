use rocket::{
    form::Form,
    get, post,
    response::{content::RawHtml, Redirect},
    routes,
    serde::json::Json,
    FromForm, Route, State,
};
use serde::Serialize;

use crate::{
    clock::Clock,
    page,
    resolver::Resolver,
    view::{Snapshot, ViewController},
};

pub fn all() -> Vec<Route> {
    routes![index, time, state, auto_location, city, refresh, change_location]
}

#[get("/")]
async fn index(view: &State<ViewController>, clock: &State<Clock>) -> RawHtml<String> {
    let snapshot = view.snapshot().await;
    RawHtml(page::render(&snapshot, &clock.current_time().await))
}

#[derive(Debug, Serialize)]
struct TimeTick {
    time: String,
    generation: u64,
}

#[get("/time")]
async fn time(view: &State<ViewController>, clock: &State<Clock>) -> Json<TimeTick> {
    Json(TimeTick {
        time: clock.current_time().await,
        generation: view.generation().await,
    })
}

#[get("/api/state")]
async fn state(view: &State<ViewController>) -> Json<Snapshot> {
    Json(view.snapshot().await)
}

#[post("/location/auto")]
fn auto_location(resolver: &State<Resolver>) -> Redirect {
    let resolver = resolver.inner().clone();
    tokio::spawn(async move {
        let _ = resolver.resolve_by_auto_location().await;
    });
    Redirect::to("/")
}

#[derive(Debug, FromForm)]
struct CityForm {
    city: Option<String>,
}

#[post("/location/city", data = "<form>")]
fn city(form: Form<CityForm>, resolver: &State<Resolver>) -> Redirect {
    let resolver = resolver.inner().clone();
    let city = form.into_inner().city.unwrap_or_default();
    tokio::spawn(async move {
        let _ = resolver.submit_city(&city).await;
    });
    Redirect::to("/")
}

#[post("/refresh")]
fn refresh(resolver: &State<Resolver>) -> Redirect {
    let resolver = resolver.inner().clone();
    tokio::spawn(async move {
        let _ = resolver.refresh().await;
    });
    Redirect::to("/")
}

#[post("/change-location")]
async fn change_location(view: &State<ViewController>) -> Redirect {
    view.show_setup().await;
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };
    use tempfile::TempDir;

    use crate::{
        app,
        geocode::Place,
        resolver::{
            tests::{capture_logs, harness, FakeGeocoder, FakeGeolocator, FakeSunset},
            EMPTY_CITY,
        },
        time::DisplayZone,
        view::ViewState,
    };

    use super::*;

    async fn client_with(geocoder: FakeGeocoder) -> (TempDir, Client) {
        // Claim the global logger before Rocket's ignite does.
        capture_logs();
        let h = harness(FakeSunset::ok(), geocoder, Arc::new(FakeGeolocator(None)));
        let clock = Clock::new(DisplayZone::Named(chrono_tz::Tz::UTC));
        let client = Client::tracked(app::assemble(clock, h.resolver)).await.unwrap();
        (h.dir, client)
    }

    async fn wait_for(client: &Client, check: impl Fn(&ViewState) -> bool) -> ViewState {
        let view = client.rocket().state::<ViewController>().unwrap();
        for _ in 0..500 {
            let state = view.snapshot().await.state;
            if check(&state) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("view never reached the expected state: {:?}", view.snapshot().await);
    }

    #[rocket::async_test]
    async fn startup_without_saved_location_renders_setup() {
        let (_dir, client) = client_with(FakeGeocoder::default()).await;
        wait_for(&client, |s| *s == ViewState::Setup).await;

        let response = client.get("/").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body = response.into_string().await.unwrap();
        assert!(body.contains(r#"<div id="setup" style="display:block">"#));
    }

    #[rocket::async_test]
    async fn time_reports_clock_and_generation() {
        let (_dir, client) = client_with(FakeGeocoder::default()).await;
        let response = client.get("/time").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let tick: serde_json::Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(tick["time"].as_str().unwrap().ends_with('M'));
        assert!(tick["generation"].is_u64());
    }

    #[rocket::async_test]
    async fn blank_city_form_shows_error() {
        let (_dir, client) = client_with(FakeGeocoder::default()).await;
        wait_for(&client, |s| *s == ViewState::Setup).await;

        let response = client
            .post("/location/city")
            .header(ContentType::Form)
            .body("city=+++")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::SeeOther);
        wait_for(&client, |s| *s == ViewState::error(EMPTY_CITY)).await;
        wait_for(&client, |s| *s == ViewState::Setup).await;
    }

    #[rocket::async_test]
    async fn city_form_leads_to_sunset_panel() {
        let geocoder = FakeGeocoder {
            place: Some(Place {
                latitude: 52.37,
                longitude: 4.89,
                display_name: String::from("Amsterdam, North Holland, Netherlands"),
            }),
            ..FakeGeocoder::default()
        };
        let (_dir, client) = client_with(geocoder).await;
        wait_for(&client, |s| *s == ViewState::Setup).await;

        client
            .post("/location/city")
            .header(ContentType::Form)
            .body("city=Amsterdam")
            .dispatch()
            .await;
        wait_for(&client, |s| matches!(s, ViewState::SunsetDisplay { .. })).await;

        let state: serde_json::Value =
            serde_json::from_str(&client.get("/api/state").dispatch().await.into_string().await.unwrap()).unwrap();
        assert_eq!(state["panel"], "sunset_display");
        assert_eq!(state["location_label"], "Amsterdam, North Holland");
        assert_eq!(state["sunset_time"], "7:30 PM");

        let response = client.post("/change-location").dispatch().await;
        assert_eq!(response.status(), Status::SeeOther);
        wait_for(&client, |s| *s == ViewState::Setup).await;

        client.post("/refresh").dispatch().await;
        let state = wait_for(&client, |s| matches!(s, ViewState::SunsetDisplay { .. })).await;
        assert!(matches!(state, ViewState::SunsetDisplay { location_label, .. } if location_label == "Amsterdam, North Holland"));
    }
}
