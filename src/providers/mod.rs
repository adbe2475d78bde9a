pub mod mythicbeasts;
