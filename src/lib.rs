//! keyroute: декларативные привязки клавиш и маршрутизация групп по экранам.
//!
//! Конфигурация собирается в неизменяемую [`configuration::Configuration`],
//! [`dispatcher::Dispatcher`] превращает события ввода в команды, а всё,
//! что касается окон, уходит к реализации [`host::Host`].

pub mod bindings;
pub mod config;
pub mod configuration;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod host;
pub mod mappings;
pub mod services;
pub mod utils;
pub mod workspace;
