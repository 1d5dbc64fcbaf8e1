mod audio;
mod auth;
mod config;
mod controller;
mod error;
mod queue;
mod resolver;
mod runtime;
mod session;
mod track;

#[cfg(test)]
mod test_support;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
