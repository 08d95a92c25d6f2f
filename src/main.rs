mod clock;
mod config;
mod confetti;
mod console;
mod console_panel;
mod gallery;
mod lab;
mod lab_panel;
mod markdown;
mod nav;
mod routes;
mod team;
mod terminal;
mod tilt;
mod writeups;

fn main() {
    dioxus::launch(routes::App);
}
