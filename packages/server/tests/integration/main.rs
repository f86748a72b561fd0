mod auth;
mod files;
mod information;
mod owners;
