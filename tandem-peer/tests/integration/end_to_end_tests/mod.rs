mod test_chat_through_broker;
